//! Command handlers for the file-transfer verbs.
//!
//! Each handler resolves its single path parameter against the session,
//! drives the storage driver or the transfer executor, and writes the
//! protocol reply. STOR, APPE and RETR first rendezvous with the
//! session's passive data channel; the channel is closed on every exit
//! path once it has been claimed.

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::io;
use std::net::TcpStream;

use crate::client::Session;
use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::protocol::commands::Command;
use crate::protocol::responses::{self, ReplyWriter};
use crate::storage::{OpenMode, StorageDriver};
use crate::transfer::data_channel::ChannelGuard;
use crate::transfer::{receive_file, send_file};

/// Session scratch key carrying the rename source between RNFR and RNTO.
pub const RNFR_KEY: &str = "rnfr";

/// Dispatches a transfer command to its handler.
///
/// Every handler writes exactly one terminal reply per invocation. The
/// exceptions are a transfer command issued without a negotiated data
/// channel and RNTO without a prior RNFR, both of which return silently;
/// the dispatcher owns reporting those preconditions.
pub fn handle_command<D: StorageDriver>(
    session: &mut Session,
    command: &Command,
    driver: &D,
    reply: &mut dyn ReplyWriter,
    config: &TransferConfig,
) -> io::Result<()> {
    match command {
        Command::STOR(path) => handle_cmd_stor(session, path, driver, reply, config),
        Command::APPE(path) => handle_cmd_appe(session, path, driver, reply, config),
        Command::RETR(path) => handle_cmd_retr(session, path, driver, reply, config),
        Command::DELE(path) => handle_cmd_dele(session, path, driver, reply),
        Command::RNFR(path) => handle_cmd_rnfr(session, path, driver, reply),
        Command::RNTO(path) => handle_cmd_rnto(session, path, driver, reply),
        Command::SIZE(path) => handle_cmd_size(session, path, driver, reply),
        Command::MDTM(path) => handle_cmd_mdtm(session, path, driver, reply),
    }
}

/// Handles the STOR command: uploads into a truncated file.
pub fn handle_cmd_stor<D: StorageDriver>(
    session: &mut Session,
    filename: &str,
    driver: &D,
    reply: &mut dyn ReplyWriter,
    config: &TransferConfig,
) -> io::Result<()> {
    store_or_append(session, filename, false, driver, reply, config)
}

/// Handles the APPE command: uploads appending to existing content.
pub fn handle_cmd_appe<D: StorageDriver>(
    session: &mut Session,
    filename: &str,
    driver: &D,
    reply: &mut dyn ReplyWriter,
    config: &TransferConfig,
) -> io::Result<()> {
    store_or_append(session, filename, true, driver, reply, config)
}

/// Shared upload path for STOR and APPE.
fn store_or_append<D: StorageDriver>(
    session: &mut Session,
    filename: &str,
    append: bool,
    driver: &D,
    reply: &mut dyn ReplyWriter,
    config: &TransferConfig,
) -> io::Result<()> {
    let Some((_guard, mut conn)) = open_data_connection(session, reply, config)? else {
        return Ok(());
    };

    let path = session.resolve_path(filename);
    info!("Upload starting for {} (append: {})", path, append);

    match upload(session, driver, &mut conn, &path, append) {
        Ok(total) => {
            info!("Upload of {} complete: {} bytes", path, total);
            reply.write_reply(
                responses::TRANSFER_COMPLETE,
                &format!("OK, received {} bytes", total),
            )?;
        }
        Err(e) => {
            error!("Upload of {} failed: {}", path, e);
            reply.write_reply(
                responses::ACTION_NOT_TAKEN,
                &format!("Error with upload: {}", e),
            )?;
        }
    }
    Ok(())
}

/// Handles the RETR command: downloads a file over the data connection.
pub fn handle_cmd_retr<D: StorageDriver>(
    session: &mut Session,
    filename: &str,
    driver: &D,
    reply: &mut dyn ReplyWriter,
    config: &TransferConfig,
) -> io::Result<()> {
    let Some((_guard, mut conn)) = open_data_connection(session, reply, config)? else {
        return Ok(());
    };

    let path = session.resolve_path(filename);
    info!("Download starting for {}", path);

    match download(session, driver, &mut conn, &path) {
        Ok(total) => {
            info!("Download of {} complete: {} bytes", path, total);
            reply.write_reply(
                responses::TRANSFER_COMPLETE,
                &format!("OK, sent {} bytes", total),
            )?;
        }
        Err(e) => {
            error!("Download of {} failed: {}", path, e);
            reply.write_reply(
                responses::ACTION_ABORTED,
                &format!("Error with download: {}", e),
            )?;
        }
    }
    Ok(())
}

/// Handles the DELE command: removes a file through the driver.
pub fn handle_cmd_dele<D: StorageDriver>(
    session: &Session,
    filename: &str,
    driver: &D,
    reply: &mut dyn ReplyWriter,
) -> io::Result<()> {
    let path = session.resolve_path(filename);
    match driver.delete_file(session, &path) {
        Ok(()) => {
            info!("Deleted {}", path);
            reply.write_reply(
                responses::FILE_ACTION_OK,
                &format!("Removed file {}", path),
            )
        }
        Err(e) => {
            error!("Failed to delete {}: {}", path, e);
            reply.write_reply(
                responses::ACTION_NOT_TAKEN,
                &format!("Couldn't delete {}: {}", path, e),
            )
        }
    }
}

/// Handles the RNFR command: probes the source path and records it for
/// the RNTO that should follow.
pub fn handle_cmd_rnfr<D: StorageDriver>(
    session: &mut Session,
    filename: &str,
    driver: &D,
    reply: &mut dyn ReplyWriter,
) -> io::Result<()> {
    let path = session.resolve_path(filename);
    match driver.file_info(session, &path) {
        Ok(_) => {
            info!("Rename source recorded: {}", path);
            reply.write_reply(responses::FILE_ACTION_OK, "Sure, give me a target")?;
            session.user_info_mut().insert(RNFR_KEY.to_string(), path);
            Ok(())
        }
        Err(e) => {
            error!("Rename source {} not accessible: {}", path, e);
            reply.write_reply(
                responses::ACTION_NOT_TAKEN,
                &format!("Couldn't access {}: {}", path, e),
            )
        }
    }
}

/// Handles the RNTO command: completes a rename prepared by RNFR.
///
/// Without a pending source this is a silent no-op. The pending entry is
/// consumed whether the rename succeeds or fails.
pub fn handle_cmd_rnto<D: StorageDriver>(
    session: &mut Session,
    filename: &str,
    driver: &D,
    reply: &mut dyn ReplyWriter,
) -> io::Result<()> {
    let dst = session.resolve_path(filename);
    let src = session
        .user_info()
        .get(RNFR_KEY)
        .cloned()
        .unwrap_or_default();
    if src.is_empty() {
        warn!("RNTO with no pending rename source");
        return Ok(());
    }

    session.user_info_mut().remove(RNFR_KEY);

    match driver.rename_file(session, &src, &dst) {
        Ok(()) => {
            info!("Renamed {} to {}", src, dst);
            reply.write_reply(responses::FILE_ACTION_OK, "Done !")
        }
        Err(e) => {
            error!("Failed to rename {} to {}: {}", src, dst, e);
            reply.write_reply(
                responses::ACTION_NOT_TAKEN,
                &format!("Couldn't rename {} to {}: {}", src, dst, e),
            )
        }
    }
}

/// Handles the SIZE command: reports the file's size in bytes.
pub fn handle_cmd_size<D: StorageDriver>(
    session: &Session,
    filename: &str,
    driver: &D,
    reply: &mut dyn ReplyWriter,
) -> io::Result<()> {
    let path = session.resolve_path(filename);
    match driver.file_info(session, &path) {
        Ok(info) => reply.write_reply(responses::FILE_STATUS, &info.size.to_string()),
        Err(e) => {
            error!("Could not stat {}: {}", path, e);
            reply.write_reply(
                responses::ACTION_NOT_TAKEN,
                &format!("Couldn't access {}: {}", path, e),
            )
        }
    }
}

/// Handles the MDTM command: reports the file's modification time as a
/// UTC `YYYYMMDDHHMMSS` timestamp.
pub fn handle_cmd_mdtm<D: StorageDriver>(
    session: &Session,
    filename: &str,
    driver: &D,
    reply: &mut dyn ReplyWriter,
) -> io::Result<()> {
    let path = session.resolve_path(filename);
    match driver.file_info(session, &path) {
        Ok(info) => {
            let modified: DateTime<Utc> = info.modified.into();
            reply.write_reply(
                responses::FILE_ACTION_OK,
                &modified.format("%Y%m%d%H%M%S").to_string(),
            )
        }
        Err(e) => {
            error!("Could not stat {}: {}", path, e);
            reply.write_reply(
                responses::ACTION_NOT_TAKEN,
                &format!("Couldn't access {}: {}", path, e),
            )
        }
    }
}

/// Claims the session's most recent passive channel and waits for the
/// client's data connection, bounded by the configured wait.
///
/// Returns `None` after writing the failure reply - or, when no channel
/// was negotiated at all, after writing nothing, since the dispatcher
/// reports that case itself. The returned guard closes the channel when
/// the calling handler finishes, however it finishes.
fn open_data_connection(
    session: &mut Session,
    reply: &mut dyn ReplyWriter,
    config: &TransferConfig,
) -> io::Result<Option<(ChannelGuard, TcpStream)>> {
    let Some(channel) = session.take_data_channel() else {
        warn!("Transfer command without a negotiated data channel");
        return Ok(None);
    };

    let guard = ChannelGuard::new(channel);

    reply.write_reply(responses::TRANSFER_STARTING, "Data transfer starting")?;

    if !guard.channel().wait_ready(config.passive_wait()) {
        error!("Timed out waiting for the passive data connection");
        reply.write_reply(responses::ACTION_NOT_TAKEN, "Could not get passive connection.")?;
        return Ok(None);
    }

    let Some(conn) = guard.channel().take_connection() else {
        error!("Passive listener failed before the data connection was established");
        reply.write_reply(responses::ACTION_NOT_TAKEN, "Could not get passive connection.")?;
        return Ok(None);
    };

    Ok(Some((guard, conn)))
}

/// Opens a driver file handle and copies the upload into it. The handle
/// is released when it drops, on every path.
fn upload<D: StorageDriver>(
    session: &Session,
    driver: &D,
    conn: &mut TcpStream,
    path: &str,
    append: bool,
) -> Result<u64, TransferError> {
    let mode = if append {
        OpenMode::Append
    } else {
        OpenMode::Write
    };
    let mut file = driver.open_file(session, path, mode)?;
    let total = receive_file(conn, &mut file)?;
    Ok(total)
}

/// Opens a driver file handle and streams it out over the connection.
fn download<D: StorageDriver>(
    session: &Session,
    driver: &D,
    conn: &mut TcpStream,
    path: &str,
) -> Result<u64, TransferError> {
    let mut file = driver.open_file(session, path, OpenMode::Read)?;
    let total = send_file(&mut file, conn)?;
    Ok(total)
}
