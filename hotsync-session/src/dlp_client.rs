//! Drives DLP request/response exchanges directly over NetSync framing —
//! the host-side counterpart of [`hotsync_dlp::client::DlpClient`], which
//! instead drives them over a PADP channel. NetSync needs no PADP: each
//! DLP message already fits in one frame.

use hotsync_dlp::catalog::DlpFunction;
use hotsync_dlp::message::{decode_response, encode_request};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;
use crate::netsync::{read_frame, write_frame};

/// Issues DLP calls to a device over an already-handshaken NetSync stream.
pub struct NetSyncDlpClient<'s, S> {
    stream: &'s mut S,
    next_xid: u8,
}

impl<'s, S> NetSyncDlpClient<'s, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: &'s mut S) -> Self {
        Self { stream, next_xid: 1 }
    }

    fn allocate_xid(&mut self) -> u8 {
        let xid = self.next_xid;
        self.next_xid = self.next_xid.wrapping_add(1).max(1);
        xid
    }

    /// Sends `func_id` with `arg_groups` and returns the raw response
    /// bytes; callers decode with [`decode_response`] to check the
    /// function id, error code and arguments.
    pub async fn call(&mut self, func_id: u8, arg_groups: &[(u8, &[u8])]) -> Result<Vec<u8>> {
        let request = encode_request(func_id, arg_groups)?;
        let xid = self.allocate_xid();
        write_frame(self.stream, xid, &request).await?;
        let (_, payload) = read_frame(self.stream).await?;
        Ok(payload)
    }

    /// Convenience wrapper that also checks the function id, error code,
    /// and (for a successful response) the catalog's declared argument
    /// count for `func_id`.
    pub async fn call_checked(&mut self, func_id: u8, arg_groups: &[(u8, &[u8])]) -> Result<Vec<u8>> {
        let raw = self.call(func_id, arg_groups).await?;
        let schema = DlpFunction::from_u8(func_id).expect("func_id came from a known DlpFunction").response_schema();
        decode_response(&raw, func_id, schema)?;
        Ok(raw)
    }
}
