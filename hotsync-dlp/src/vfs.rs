//! VFS and expansion-card command arguments.
//!
//! The catalog's VFS/Exp function ids (`0x3C..=0x61`, minus the two tethered
//! conduit-boundary ids interleaved in that range) share one shape: a volume
//! or file-handle reference, an optional path string, and a handful of
//! fixed-width fields — the same shape record and resource I/O already use.
//! Rather than 35 bespoke structs this module has a handful of reusable ones
//! shared across every command whose argument matches; see
//! [`crate::catalog`] for the function ids that reference them.

use crate::datetime::{self, PalmDateTime};
use crate::error::{DlpError, Result};
use crate::message::{decode_cstr, encode_cstr, require_len, require_min_len};

/// A mounted VFS volume, identified by its volume reference number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeRef(pub u16);

/// A handle returned by `VfsFileOpen`, distinct from a database [`DbHandle`]
/// since VFS handles travel as four bytes on the wire.
///
/// [`DbHandle`]: crate::catalog::DbHandle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHandle(pub u32);

/// Argument shape shared by every VFS command that acts on an already-open
/// handle and nothing else (`VfsFileClose`, `VfsFileEof`, `VfsFileTell`,
/// `VfsFileGetAttributes`, `VfsFileGetDate`, `VfsFileSize`).
#[derive(Debug, Clone, Copy)]
pub struct VfsFileHandleRequest {
    pub handle: FileHandle,
}

impl VfsFileHandleRequest {
    pub const WIRE_SIZE: usize = 4;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { handle: FileHandle(u32::from_be_bytes(data[0..4].try_into().unwrap())) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.handle.0.to_be_bytes()
    }
}

/// Argument shape for commands that take a volume and a single path
/// (`VfsFileCreate`, `VfsFileDelete`, `VfsDirCreate`, `VfsGetDefaultDir`,
/// `VfsImportDatabaseFromFile`).
#[derive(Debug, Clone)]
pub struct VfsPathRequest {
    pub volume: VolumeRef,
    pub path: String,
}

impl VfsPathRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 2)?;
        let volume = VolumeRef(u16::from_be_bytes(data[0..2].try_into().unwrap()));
        let (path, _) = decode_cstr(&data[2..])?;
        Ok(Self { volume, path })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.volume.0.to_be_bytes().to_vec();
        encode_cstr(&mut out, &self.path);
        out
    }
}

/// `VfsPathRequest` decoded out of a response, for `VfsGetDefaultDir` and
/// `VfsImportDatabaseFromFile`'s returned path/id — the only two VFS calls
/// whose response carries a string rather than a fixed record.
#[derive(Debug, Clone)]
pub struct VfsPathResponse {
    pub path: String,
}

impl VfsPathResponse {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (path, _) = decode_cstr(data)?;
        Ok(Self { path })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_cstr(&mut out, &self.path);
        out
    }
}

/// Argument shape for commands that move a database between device VFS and
/// a desktop-visible path or vice versa (`VfsExportDatabaseToFile`), and for
/// renaming a VFS file in place.
#[derive(Debug, Clone)]
pub struct VfsTwoPathRequest {
    pub volume: VolumeRef,
    pub source: String,
    pub destination: String,
}

impl VfsTwoPathRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 2)?;
        let volume = VolumeRef(u16::from_be_bytes(data[0..2].try_into().unwrap()));
        let (source, consumed) = decode_cstr(&data[2..])?;
        let (destination, _) = decode_cstr(&data[2 + consumed..])?;
        Ok(Self { volume, source, destination })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.volume.0.to_be_bytes().to_vec();
        encode_cstr(&mut out, &self.source);
        encode_cstr(&mut out, &self.destination);
        out
    }
}

/// `VfsFileOpen` request: a volume, an open mode, and the path to open.
#[derive(Debug, Clone)]
pub struct VfsFileOpenRequest {
    pub volume: VolumeRef,
    pub mode: u16,
    pub path: String,
}

impl VfsFileOpenRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 4)?;
        let volume = VolumeRef(u16::from_be_bytes(data[0..2].try_into().unwrap()));
        let mode = u16::from_be_bytes(data[2..4].try_into().unwrap());
        let (path, _) = decode_cstr(&data[4..])?;
        Ok(Self { volume, mode, path })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.volume.0.to_be_bytes().to_vec();
        out.extend_from_slice(&self.mode.to_be_bytes());
        encode_cstr(&mut out, &self.path);
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VfsFileOpenResponse {
    pub handle: FileHandle,
}

impl VfsFileOpenResponse {
    pub const WIRE_SIZE: usize = 4;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { handle: FileHandle(u32::from_be_bytes(data[0..4].try_into().unwrap())) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.handle.0.to_be_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct VfsFileReadRequest {
    pub handle: FileHandle,
    pub num_bytes: u32,
}

impl VfsFileReadRequest {
    pub const WIRE_SIZE: usize = 8;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: FileHandle(u32::from_be_bytes(data[0..4].try_into().unwrap())),
            num_bytes: u32::from_be_bytes(data[4..8].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.handle.0.to_be_bytes());
        out[4..8].copy_from_slice(&self.num_bytes.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone)]
pub struct VfsFileWriteRequest {
    pub handle: FileHandle,
    pub data: Vec<u8>,
}

impl VfsFileWriteRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 4)?;
        Ok(Self { handle: FileHandle(u32::from_be_bytes(data[0..4].try_into().unwrap())), data: data[4..].to_vec() })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.handle.0.to_be_bytes().to_vec();
        out.extend_from_slice(&self.data);
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VfsFileWriteResponse {
    pub written: u32,
}

impl VfsFileWriteResponse {
    pub const WIRE_SIZE: usize = 4;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { written: u32::from_be_bytes(data[0..4].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.written.to_be_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct VfsFileSeekRequest {
    pub handle: FileHandle,
    pub mode: u8,
    pub offset: i32,
}

impl VfsFileSeekRequest {
    pub const WIRE_SIZE: usize = 4 + 1 + 4;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: FileHandle(u32::from_be_bytes(data[0..4].try_into().unwrap())),
            mode: data[4],
            offset: i32::from_be_bytes(data[5..9].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.handle.0.to_be_bytes());
        out[4] = self.mode;
        out[5..9].copy_from_slice(&self.offset.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VfsFileResizeRequest {
    pub handle: FileHandle,
    pub new_size: u32,
}

impl VfsFileResizeRequest {
    pub const WIRE_SIZE: usize = 8;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: FileHandle(u32::from_be_bytes(data[0..4].try_into().unwrap())),
            new_size: u32::from_be_bytes(data[4..8].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.handle.0.to_be_bytes());
        out[4..8].copy_from_slice(&self.new_size.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VfsFileTellResponse {
    pub offset: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct VfsFileSizeResponse {
    pub size: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct VfsAttributesResponse {
    pub attributes: u32,
}

/// Shared wire form of the three single-`u32` VFS responses above
/// (`VfsFileTell`, `VfsFileSize`, `VfsFileGetAttributes`) — same shape,
/// different meaning per caller.
pub fn decode_u32_response(data: &[u8]) -> Result<u32> {
    require_len(data, 4)?;
    Ok(u32::from_be_bytes(data[0..4].try_into().unwrap()))
}

pub fn encode_u32_response(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

#[derive(Debug, Clone, Copy)]
pub struct VfsSetAttributesRequest {
    pub handle: FileHandle,
    pub attributes: u32,
}

impl VfsSetAttributesRequest {
    pub const WIRE_SIZE: usize = 8;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: FileHandle(u32::from_be_bytes(data[0..4].try_into().unwrap())),
            attributes: u32::from_be_bytes(data[4..8].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.handle.0.to_be_bytes());
        out[4..8].copy_from_slice(&self.attributes.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VfsDateResponse {
    pub when: PalmDateTime,
}

impl VfsDateResponse {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, datetime::WIRE_SIZE)?;
        Ok(Self { when: PalmDateTime::decode(data)? })
    }

    pub fn encode(&self) -> Result<[u8; datetime::WIRE_SIZE]> {
        let mut out = [0u8; datetime::WIRE_SIZE];
        self.when.encode(&mut out)?;
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VfsSetDateRequest {
    pub handle: FileHandle,
    pub when: PalmDateTime,
}

impl VfsSetDateRequest {
    pub const WIRE_SIZE: usize = 4 + datetime::WIRE_SIZE;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: FileHandle(u32::from_be_bytes(data[0..4].try_into().unwrap())),
            when: PalmDateTime::decode(&data[4..Self::WIRE_SIZE])?,
        })
    }

    pub fn encode(&self) -> Result<[u8; Self::WIRE_SIZE]> {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.handle.0.to_be_bytes());
        self.when.encode(&mut out[4..])?;
        Ok(out)
    }
}

/// One entry of a `VfsDirEntryEnumerate` response.
#[derive(Debug, Clone)]
pub struct VfsDirEntry {
    pub attributes: u32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct VfsDirEntryEnumerateRequest {
    pub handle: FileHandle,
    pub iterator: u32,
}

impl VfsDirEntryEnumerateRequest {
    pub const WIRE_SIZE: usize = 8;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: FileHandle(u32::from_be_bytes(data[0..4].try_into().unwrap())),
            iterator: u32::from_be_bytes(data[4..8].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.handle.0.to_be_bytes());
        out[4..8].copy_from_slice(&self.iterator.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone)]
pub struct VfsDirEntryEnumerateResponse {
    pub iterator: u32,
    pub entries: Vec<VfsDirEntry>,
}

impl VfsDirEntryEnumerateResponse {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 4 + 2)?;
        let iterator = u32::from_be_bytes(data[0..4].try_into().unwrap());
        let count = u16::from_be_bytes(data[4..6].try_into().unwrap()) as usize;
        let mut offset = 6;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            require_min_len(&data[offset..], 4)?;
            let attributes = u32::from_be_bytes(data[offset..offset + 4].try_into().unwrap());
            let (name, consumed) = decode_cstr(&data[offset + 4..])?;
            offset += 4 + consumed;
            entries.push(VfsDirEntry { attributes, name });
        }
        Ok(Self { iterator, entries })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.entries.len() > u16::MAX as usize {
            return Err(DlpError::ArgTooLarge(self.entries.len()));
        }
        let mut out = self.iterator.to_be_bytes().to_vec();
        out.extend_from_slice(&(self.entries.len() as u16).to_be_bytes());
        for entry in &self.entries {
            out.extend_from_slice(&entry.attributes.to_be_bytes());
            encode_cstr(&mut out, &entry.name);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct VfsVolumeEnumerateResponse {
    pub volumes: Vec<VolumeRef>,
}

impl VfsVolumeEnumerateResponse {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 2)?;
        let count = u16::from_be_bytes(data[0..2].try_into().unwrap()) as usize;
        require_len(&data[2..], count * 2)?;
        let volumes = data[2..].chunks_exact(2).map(|c| VolumeRef(u16::from_be_bytes([c[0], c[1]]))).collect();
        Ok(Self { volumes })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.volumes.len() > u16::MAX as usize {
            return Err(DlpError::ArgTooLarge(self.volumes.len()));
        }
        let mut out = (self.volumes.len() as u16).to_be_bytes().to_vec();
        for v in &self.volumes {
            out.extend_from_slice(&v.0.to_be_bytes());
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VfsVolumeInfoRequest {
    pub volume: VolumeRef,
}

impl VfsVolumeInfoRequest {
    pub const WIRE_SIZE: usize = 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { volume: VolumeRef(u16::from_be_bytes(data[0..2].try_into().unwrap())) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.volume.0.to_be_bytes()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VfsVolumeInfoResponse {
    pub attributes: u32,
    pub fs_type: u32,
    pub fs_creator: u32,
    pub mount_class: u32,
}

impl VfsVolumeInfoResponse {
    pub const WIRE_SIZE: usize = 16;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            attributes: u32::from_be_bytes(data[0..4].try_into().unwrap()),
            fs_type: u32::from_be_bytes(data[4..8].try_into().unwrap()),
            fs_creator: u32::from_be_bytes(data[8..12].try_into().unwrap()),
            mount_class: u32::from_be_bytes(data[12..16].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.attributes.to_be_bytes());
        out[4..8].copy_from_slice(&self.fs_type.to_be_bytes());
        out[8..12].copy_from_slice(&self.fs_creator.to_be_bytes());
        out[12..16].copy_from_slice(&self.mount_class.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone)]
pub struct VfsVolumeLabelResponse {
    pub label: String,
}

impl VfsVolumeLabelResponse {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (label, _) = decode_cstr(data)?;
        Ok(Self { label })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_cstr(&mut out, &self.label);
        out
    }
}

#[derive(Debug, Clone)]
pub struct VfsVolumeSetLabelRequest {
    pub volume: VolumeRef,
    pub label: String,
}

impl VfsVolumeSetLabelRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 2)?;
        let volume = VolumeRef(u16::from_be_bytes(data[0..2].try_into().unwrap()));
        let (label, _) = decode_cstr(&data[2..])?;
        Ok(Self { volume, label })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.volume.0.to_be_bytes().to_vec();
        encode_cstr(&mut out, &self.label);
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VfsVolumeSizeResponse {
    pub bytes_used: u32,
    pub bytes_total: u32,
}

impl VfsVolumeSizeResponse {
    pub const WIRE_SIZE: usize = 8;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            bytes_used: u32::from_be_bytes(data[0..4].try_into().unwrap()),
            bytes_total: u32::from_be_bytes(data[4..8].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.bytes_used.to_be_bytes());
        out[4..8].copy_from_slice(&self.bytes_total.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VfsVolumeFormatRequest {
    pub volume: VolumeRef,
    pub fs_type: u32,
}

impl VfsVolumeFormatRequest {
    pub const WIRE_SIZE: usize = 6;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            volume: VolumeRef(u16::from_be_bytes(data[0..2].try_into().unwrap())),
            fs_type: u32::from_be_bytes(data[2..6].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..2].copy_from_slice(&self.volume.0.to_be_bytes());
        out[2..6].copy_from_slice(&self.fs_type.to_be_bytes());
        out
    }
}

/// `VfsCustomControl`'s argument: a vendor- or filesystem-specific opcode
/// against an open handle, carrying an opaque payload neither side
/// interprets generically.
#[derive(Debug, Clone)]
pub struct VfsCustomControlRequest {
    pub handle: FileHandle,
    pub op: u16,
    pub data: Vec<u8>,
}

impl VfsCustomControlRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 6)?;
        Ok(Self {
            handle: FileHandle(u32::from_be_bytes(data[0..4].try_into().unwrap())),
            op: u16::from_be_bytes(data[4..6].try_into().unwrap()),
            data: data[6..].to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.handle.0.to_be_bytes().to_vec();
        out.extend_from_slice(&self.op.to_be_bytes());
        out.extend_from_slice(&self.data);
        out
    }
}

/// `VfsImportDatabaseFromFile`'s response: the locally-created database's
/// unique id, the one piece of state the caller can't derive itself.
#[derive(Debug, Clone, Copy)]
pub struct VfsImportDatabaseResponse {
    pub local_id: u32,
}

impl VfsImportDatabaseResponse {
    pub const WIRE_SIZE: usize = 4;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { local_id: u32::from_be_bytes(data[0..4].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.local_id.to_be_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct VfsExportDatabaseRequest {
    pub volume: VolumeRef,
    pub card_no: u16,
    pub name: String,
    pub path: String,
}

impl VfsExportDatabaseRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 4)?;
        let volume = VolumeRef(u16::from_be_bytes(data[0..2].try_into().unwrap()));
        let card_no = u16::from_be_bytes(data[2..4].try_into().unwrap());
        let (name, consumed) = decode_cstr(&data[4..])?;
        let (path, _) = decode_cstr(&data[4 + consumed..])?;
        Ok(Self { volume, card_no, name, path })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.volume.0.to_be_bytes().to_vec();
        out.extend_from_slice(&self.card_no.to_be_bytes());
        encode_cstr(&mut out, &self.name);
        encode_cstr(&mut out, &self.path);
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExpSlotRequest {
    pub slot: u16,
}

impl ExpSlotRequest {
    pub const WIRE_SIZE: usize = 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { slot: u16::from_be_bytes(data[0..2].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.slot.to_be_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct ExpSlotEnumerateResponse {
    pub slots: Vec<u16>,
}

impl ExpSlotEnumerateResponse {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 2)?;
        let count = u16::from_be_bytes(data[0..2].try_into().unwrap()) as usize;
        require_len(&data[2..], count * 2)?;
        let slots = data[2..].chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
        Ok(Self { slots })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.slots.len() > u16::MAX as usize {
            return Err(DlpError::ArgTooLarge(self.slots.len()));
        }
        let mut out = (self.slots.len() as u16).to_be_bytes().to_vec();
        for s in &self.slots {
            out.extend_from_slice(&s.to_be_bytes());
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct ExpCardInfoResponse {
    pub card_id: u32,
    pub card_version: u16,
    pub name: String,
    pub manufacturer: String,
}

impl ExpCardInfoResponse {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 6)?;
        let card_id = u32::from_be_bytes(data[0..4].try_into().unwrap());
        let card_version = u16::from_be_bytes(data[4..6].try_into().unwrap());
        let (name, consumed) = decode_cstr(&data[6..])?;
        let (manufacturer, _) = decode_cstr(&data[6 + consumed..])?;
        Ok(Self { card_id, card_version, name, manufacturer })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.card_id.to_be_bytes().to_vec();
        out.extend_from_slice(&self.card_version.to_be_bytes());
        encode_cstr(&mut out, &self.name);
        encode_cstr(&mut out, &self.manufacturer);
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExpSlotMediaTypeResponse {
    pub media_type: u32,
}

impl ExpSlotMediaTypeResponse {
    pub const WIRE_SIZE: usize = 4;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { media_type: u32::from_be_bytes(data[0..4].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.media_type.to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_open_request_round_trips_with_a_path() {
        let req = VfsFileOpenRequest { volume: VolumeRef(1), mode: 0x20, path: "/PALM/Launcher/foo.pdb".into() };
        let decoded = VfsFileOpenRequest::decode(&req.encode()).unwrap();
        assert_eq!(decoded.volume, req.volume);
        assert_eq!(decoded.path, req.path);
    }

    #[test]
    fn dir_entry_enumerate_response_round_trips() {
        let resp = VfsDirEntryEnumerateResponse {
            iterator: 0xFFFFFFFF,
            entries: vec![
                VfsDirEntry { attributes: 0, name: "foo.pdb".into() },
                VfsDirEntry { attributes: 0x10, name: "bar.prc".into() },
            ],
        };
        let decoded = VfsDirEntryEnumerateResponse::decode(&resp.encode().unwrap()).unwrap();
        assert_eq!(decoded.entries.len(), 2);
        assert_eq!(decoded.entries[1].name, "bar.prc");
    }

    #[test]
    fn volume_enumerate_response_round_trips() {
        let resp = VfsVolumeEnumerateResponse { volumes: vec![VolumeRef(1), VolumeRef(2)] };
        let decoded = VfsVolumeEnumerateResponse::decode(&resp.encode().unwrap()).unwrap();
        assert_eq!(decoded.volumes, resp.volumes);
    }

    #[test]
    fn file_handle_request_rejects_wrong_length() {
        assert!(VfsFileHandleRequest::decode(&[0u8; 3]).is_err());
    }

    #[test]
    fn custom_control_carries_an_opaque_payload() {
        let req = VfsCustomControlRequest { handle: FileHandle(7), op: 42, data: vec![1, 2, 3] };
        let decoded = VfsCustomControlRequest::decode(&req.encode()).unwrap();
        assert_eq!(decoded.op, 42);
        assert_eq!(decoded.data, vec![1, 2, 3]);
    }
}
