//! The DLP command catalog: function ids and the typed request/response
//! pairs for every command in the 0x10..=0x61 range.
//!
//! Every command a HotSync conduit can issue belongs to one of a handful
//! of categories (system info, database lifecycle, block I/O, record I/O,
//! resource I/O, app preferences, NetSync info, conduit boundary, sync
//! control, VFS). The ids below are the ones the Palm OS HotSync Manager
//! has used since DLP 1.0; they're reproduced here verbatim since
//! third-party conduits and the device ROM both hardcode them and a
//! HotSync stack that renumbered them would simply fail to interoperate.
//!
//! Every function id carries a [`DlpFunction::request_schema`] /
//! [`DlpFunction::response_schema`] pair declaring how many argument groups
//! it requires, and a typed struct for any argument whose shape is more
//! than an opaque blob. VFS and expansion-card commands share one set of
//! generic structs in [`crate::vfs`] rather than 35 near-identical ones —
//! the catalog only needs their schemas here.

use crate::args::ArgSchema;
use crate::datetime::{self, PalmDateTime};
use crate::error::{DlpError, Result};
use crate::message::{decode_cstr, encode_cstr, require_len, require_min_len};

macro_rules! dlp_functions {
    ($($variant:ident = $id:expr, $category:expr, req($rq:expr, $ro:expr), resp($sq:expr, $so:expr);)+) => {
        /// A DLP function id, named per the catalog.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        pub enum DlpFunction {
            $($variant = $id,)+
        }

        impl DlpFunction {
            pub const fn from_u8(id: u8) -> Option<Self> {
                match id {
                    $($id => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub const fn id(self) -> u8 {
                self as u8
            }

            pub const fn category(self) -> DlpCategory {
                match self {
                    $(Self::$variant => $category,)+
                }
            }

            /// How many argument groups a request for this function
            /// declares required/optional. Enforced by
            /// [`crate::message::decode_request`].
            pub const fn request_schema(self) -> ArgSchema {
                match self {
                    $(Self::$variant => ArgSchema::with_optional($rq, $ro),)+
                }
            }

            /// How many argument groups a successful response for this
            /// function declares required/optional. Enforced by
            /// [`crate::message::decode_response`].
            pub const fn response_schema(self) -> ArgSchema {
                match self {
                    $(Self::$variant => ArgSchema::with_optional($sq, $so),)+
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DlpCategory {
    System,
    DatabaseLifecycle,
    BlockIo,
    RecordIo,
    ResourceIo,
    AppPreferences,
    NetSyncInfo,
    ConduitBoundary,
    SyncControl,
    Vfs,
}

dlp_functions! {
    ReadUserInfo = 0x10, DlpCategory::System, req(0, 0), resp(1, 0);
    WriteUserInfo = 0x11, DlpCategory::System, req(1, 0), resp(0, 0);
    ReadSysInfo = 0x12, DlpCategory::System, req(0, 0), resp(1, 0);
    GetSysDateTime = 0x13, DlpCategory::System, req(0, 0), resp(1, 0);
    SetSysDateTime = 0x14, DlpCategory::System, req(1, 0), resp(0, 0);
    ReadStorageInfo = 0x15, DlpCategory::System, req(1, 0), resp(1, 0);
    ReadDbList = 0x16, DlpCategory::DatabaseLifecycle, req(1, 0), resp(1, 0);
    OpenDb = 0x17, DlpCategory::DatabaseLifecycle, req(1, 0), resp(1, 0);
    CreateDb = 0x18, DlpCategory::DatabaseLifecycle, req(1, 0), resp(1, 0);
    CloseDb = 0x19, DlpCategory::DatabaseLifecycle, req(1, 0), resp(0, 0);
    DeleteDb = 0x1A, DlpCategory::DatabaseLifecycle, req(1, 0), resp(0, 0);
    ReadAppBlock = 0x1B, DlpCategory::BlockIo, req(1, 0), resp(1, 0);
    WriteAppBlock = 0x1C, DlpCategory::BlockIo, req(1, 0), resp(0, 0);
    ReadSortBlock = 0x1D, DlpCategory::BlockIo, req(1, 0), resp(1, 0);
    WriteSortBlock = 0x1E, DlpCategory::BlockIo, req(1, 0), resp(0, 0);
    ReadNextModifiedRec = 0x1F, DlpCategory::RecordIo, req(1, 0), resp(1, 0);
    ReadRecordById = 0x20, DlpCategory::RecordIo, req(1, 0), resp(1, 0);
    ReadRecordByIndex = 0x21, DlpCategory::RecordIo, req(1, 0), resp(1, 0);
    WriteRecord = 0x22, DlpCategory::RecordIo, req(1, 0), resp(1, 0);
    DeleteRecord = 0x23, DlpCategory::RecordIo, req(1, 0), resp(0, 0);
    ReadResourceByIndex = 0x24, DlpCategory::ResourceIo, req(1, 0), resp(1, 0);
    WriteResource = 0x25, DlpCategory::ResourceIo, req(1, 0), resp(0, 0);
    DeleteResource = 0x26, DlpCategory::ResourceIo, req(1, 0), resp(0, 0);
    CleanUpDatabase = 0x27, DlpCategory::DatabaseLifecycle, req(1, 0), resp(0, 0);
    ResetSyncFlags = 0x28, DlpCategory::SyncControl, req(1, 0), resp(0, 0);
    CallApplication = 0x29, DlpCategory::ConduitBoundary, req(1, 0), resp(0, 1);
    ResetSystem = 0x2A, DlpCategory::System, req(0, 0), resp(0, 0);
    AddSyncLogEntry = 0x2B, DlpCategory::SyncControl, req(1, 0), resp(0, 0);
    ReadOpenDbInfo = 0x2C, DlpCategory::DatabaseLifecycle, req(1, 0), resp(1, 0);
    MoveCategory = 0x2D, DlpCategory::RecordIo, req(1, 0), resp(0, 0);
    ProcessRpc = 0x2E, DlpCategory::ConduitBoundary, req(1, 0), resp(0, 1);
    OpenConduit = 0x2F, DlpCategory::SyncControl, req(0, 0), resp(0, 0);
    EndOfSync = 0x30, DlpCategory::SyncControl, req(1, 0), resp(0, 0);
    ResetRecordIndex = 0x31, DlpCategory::RecordIo, req(1, 0), resp(0, 0);
    ReadRecordIdList = 0x32, DlpCategory::RecordIo, req(1, 0), resp(1, 0);
    ReadNextRecInCategory = 0x33, DlpCategory::RecordIo, req(1, 0), resp(1, 0);
    ReadNextModifiedRecInCategory = 0x34, DlpCategory::RecordIo, req(1, 0), resp(1, 0);
    ReadAppPreference = 0x35, DlpCategory::AppPreferences, req(1, 0), resp(2, 0);
    WriteAppPreference = 0x36, DlpCategory::AppPreferences, req(2, 0), resp(0, 0);
    ReadNetSyncInfo = 0x37, DlpCategory::NetSyncInfo, req(0, 0), resp(1, 0);
    WriteNetSyncInfo = 0x38, DlpCategory::NetSyncInfo, req(1, 0), resp(0, 0);
    ReadFeature = 0x39, DlpCategory::System, req(1, 0), resp(1, 0);
    FindDb = 0x3A, DlpCategory::DatabaseLifecycle, req(1, 0), resp(1, 0);
    SetDbInfo = 0x3B, DlpCategory::DatabaseLifecycle, req(1, 0), resp(0, 0);
    VfsCustomControl = 0x3C, DlpCategory::Vfs, req(1, 0), resp(0, 1);
    VfsGetDefaultDir = 0x3D, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsImportDatabaseFromFile = 0x3E, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsExportDatabaseToFile = 0x3F, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsFileCreate = 0x40, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsFileOpen = 0x41, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsFileClose = 0x42, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsFileWrite = 0x43, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsFileRead = 0x44, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsFileDelete = 0x45, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsFileRename = 0x46, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsFileEof = 0x47, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsFileTell = 0x48, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsFileGetAttributes = 0x49, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsFileSetAttributes = 0x4A, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsFileGetDate = 0x4B, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsFileSetDate = 0x4C, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsDirCreate = 0x4D, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsDirEntryEnumerate = 0x4E, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsGetFile = 0x4F, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsPutFile = 0x50, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsVolumeFormat = 0x51, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsVolumeEnumerate = 0x52, DlpCategory::Vfs, req(0, 0), resp(1, 0);
    VfsVolumeInfo = 0x53, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsVolumeGetLabel = 0x54, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsVolumeSetLabel = 0x55, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsVolumeSize = 0x56, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    VfsFileSeek = 0x57, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsFileResize = 0x58, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    VfsFileSize = 0x59, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    ExpSlotEnumerate = 0x5A, DlpCategory::Vfs, req(0, 0), resp(1, 0);
    ExpCardPresent = 0x5B, DlpCategory::Vfs, req(1, 0), resp(0, 0);
    ExpCardInfo = 0x5C, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    ReadTetheredAppInfo = 0x5D, DlpCategory::ConduitBoundary, req(0, 0), resp(1, 0);
    VfsVolumeGetBytesUsed = 0x5E, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    WriteTetheredAppInfo = 0x5F, DlpCategory::ConduitBoundary, req(1, 0), resp(0, 0);
    ExpSlotMediaType = 0x60, DlpCategory::Vfs, req(1, 0), resp(1, 0);
    OpenDbWithUniqueId = 0x61, DlpCategory::DatabaseLifecycle, req(1, 0), resp(1, 0);
}

// --- System info -----------------------------------------------------

/// Argument payload of a `ReadUserInfo` response. Mirrors the fields a sync
/// engine needs to know which desktop this device last paired with.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub user_id: u32,
    pub last_sync_pc_id: u32,
    pub last_sync_time: PalmDateTime,
    pub user_name: String,
}

impl UserInfo {
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < 4 + 4 + datetime::WIRE_SIZE + 2 {
            return Err(DlpError::Truncated);
        }
        let user_id = u32::from_be_bytes(data[0..4].try_into().unwrap());
        let last_sync_pc_id = u32::from_be_bytes(data[4..8].try_into().unwrap());
        let last_sync_time = PalmDateTime::decode(&data[8..8 + datetime::WIRE_SIZE])?;
        let mut offset = 8 + datetime::WIRE_SIZE;
        let name_len = u16::from_be_bytes(data[offset..offset + 2].try_into().unwrap()) as usize;
        offset += 2;
        if data.len() < offset + name_len {
            return Err(DlpError::Truncated);
        }
        let trimmed_len = name_len.saturating_sub(1);
        let user_name = String::from_utf8_lossy(&data[offset..offset + trimmed_len]).into_owned();
        Ok(Self { user_id, last_sync_pc_id, last_sync_time, user_name })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.user_id.to_be_bytes());
        out.extend_from_slice(&self.last_sync_pc_id.to_be_bytes());
        let mut dt_buf = [0u8; datetime::WIRE_SIZE];
        self.last_sync_time.encode(&mut dt_buf).expect("fixed-size buffer");
        out.extend_from_slice(&dt_buf);
        let mut name = self.user_name.clone().into_bytes();
        name.push(0);
        out.extend_from_slice(&(name.len() as u16).to_be_bytes());
        out.extend_from_slice(&name);
        out
    }
}

/// `WriteUserInfo`'s request carries a modification bitmask so the caller
/// can update one field (say, just `last_sync_time`) without resending the
/// others; fields left `None` are omitted from the wire form and left
/// untouched on the receiving side.
#[derive(Debug, Clone, Default)]
pub struct WriteUserInfoRequest {
    pub user_id: Option<u32>,
    pub last_sync_pc_id: Option<u32>,
    pub last_sync_time: Option<PalmDateTime>,
    pub user_name: Option<String>,
}

impl WriteUserInfoRequest {
    const FLAG_USER_ID: u8 = 0x01;
    const FLAG_LAST_SYNC_PC_ID: u8 = 0x02;
    const FLAG_LAST_SYNC_TIME: u8 = 0x04;
    const FLAG_USER_NAME: u8 = 0x08;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 1)?;
        let flags = data[0];
        let mut offset = 1;
        let mut take4 = |present: bool| -> Result<Option<u32>> {
            if !present {
                return Ok(None);
            }
            require_min_len(&data[offset..], 4)?;
            let v = u32::from_be_bytes(data[offset..offset + 4].try_into().unwrap());
            offset += 4;
            Ok(Some(v))
        };
        let user_id = take4(flags & Self::FLAG_USER_ID != 0)?;
        let last_sync_pc_id = take4(flags & Self::FLAG_LAST_SYNC_PC_ID != 0)?;
        let last_sync_time = if flags & Self::FLAG_LAST_SYNC_TIME != 0 {
            require_min_len(&data[offset..], datetime::WIRE_SIZE)?;
            let dt = PalmDateTime::decode(&data[offset..offset + datetime::WIRE_SIZE])?;
            offset += datetime::WIRE_SIZE;
            Some(dt)
        } else {
            None
        };
        let user_name = if flags & Self::FLAG_USER_NAME != 0 {
            let (name, _) = decode_cstr(&data[offset..])?;
            Some(name)
        } else {
            None
        };
        Ok(Self { user_id, last_sync_pc_id, last_sync_time, user_name })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut flags = 0u8;
        let mut out = vec![0u8];
        if let Some(v) = self.user_id {
            flags |= Self::FLAG_USER_ID;
            out.extend_from_slice(&v.to_be_bytes());
        }
        if let Some(v) = self.last_sync_pc_id {
            flags |= Self::FLAG_LAST_SYNC_PC_ID;
            out.extend_from_slice(&v.to_be_bytes());
        }
        if let Some(dt) = self.last_sync_time {
            flags |= Self::FLAG_LAST_SYNC_TIME;
            let mut buf = [0u8; datetime::WIRE_SIZE];
            dt.encode(&mut buf).expect("fixed-size buffer");
            out.extend_from_slice(&buf);
        }
        if let Some(name) = &self.user_name {
            flags |= Self::FLAG_USER_NAME;
            encode_cstr(&mut out, name);
        }
        out[0] = flags;
        out
    }
}

/// Argument payload of a `ReadSysInfo` response, trimmed to what conduits
/// actually consult: the device's ROM version and product identifiers.
#[derive(Debug, Clone, Copy)]
pub struct SysInfo {
    pub rom_version: u32,
    pub locale: u32,
    pub product_id: u16,
}

impl SysInfo {
    pub const WIRE_SIZE: usize = 4 + 4 + 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            rom_version: u32::from_be_bytes(data[0..4].try_into().unwrap()),
            locale: u32::from_be_bytes(data[4..8].try_into().unwrap()),
            product_id: u16::from_be_bytes(data[8..10].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.rom_version.to_be_bytes());
        out[4..8].copy_from_slice(&self.locale.to_be_bytes());
        out[8..10].copy_from_slice(&self.product_id.to_be_bytes());
        out
    }
}

/// `ReadStorageInfo`'s request names which card to describe; its response
/// is the usual mix of totals and a card name.
#[derive(Debug, Clone, Copy)]
pub struct ReadStorageInfoRequest {
    pub card_no: u16,
}

impl ReadStorageInfoRequest {
    pub const WIRE_SIZE: usize = 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { card_no: u16::from_be_bytes(data[0..2].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.card_no.to_be_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct StorageInfo {
    pub total_bytes: u32,
    pub free_bytes: u32,
    pub card_name: String,
}

impl StorageInfo {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 8)?;
        let total_bytes = u32::from_be_bytes(data[0..4].try_into().unwrap());
        let free_bytes = u32::from_be_bytes(data[4..8].try_into().unwrap());
        let (card_name, _) = decode_cstr(&data[8..])?;
        Ok(Self { total_bytes, free_bytes, card_name })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.total_bytes.to_be_bytes().to_vec();
        out.extend_from_slice(&self.free_bytes.to_be_bytes());
        encode_cstr(&mut out, &self.card_name);
        out
    }
}

/// `ReadFeature` looks a feature up by creator and index.
#[derive(Debug, Clone, Copy)]
pub struct ReadFeatureRequest {
    pub creator: [u8; 4],
    pub feature_num: u16,
}

impl ReadFeatureRequest {
    pub const WIRE_SIZE: usize = 6;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { creator: data[0..4].try_into().unwrap(), feature_num: u16::from_be_bytes(data[4..6].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.creator);
        out[4..6].copy_from_slice(&self.feature_num.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadFeatureResponse {
    pub value: u32,
}

impl ReadFeatureResponse {
    pub const WIRE_SIZE: usize = 4;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { value: u32::from_be_bytes(data[0..4].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.value.to_be_bytes()
    }
}

// --- Database lifecycle ----------------------------------------------

/// Open mode flags for `OpenDb`, packed into a single byte on the wire.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenMode {
    pub read: bool,
    pub write: bool,
    pub exclusive: bool,
    pub show_secret: bool,
}

impl OpenMode {
    pub const fn to_byte(self) -> u8 {
        (self.read as u8) | ((self.write as u8) << 1) | ((self.exclusive as u8) << 5) | ((self.show_secret as u8) << 6)
    }

    pub const fn from_byte(b: u8) -> Self {
        Self { read: b & 1 != 0, write: b & 2 != 0, exclusive: b & 0x20 != 0, show_secret: b & 0x40 != 0 }
    }
}

/// Handle returned by `OpenDb`/`CreateDb`, opaque beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DbHandle(pub u8);

/// Argument shape shared by every database command that needs nothing but
/// an already-open handle (`CloseDb`, `CleanUpDatabase`, `ResetRecordIndex`,
/// `ResetSyncFlags`).
#[derive(Debug, Clone, Copy)]
pub struct DbHandleArg {
    pub handle: DbHandle,
}

impl DbHandleArg {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, 1)?;
        Ok(Self { handle: DbHandle(data[0]) })
    }

    pub fn encode(&self) -> [u8; 1] {
        [self.handle.0]
    }
}

#[derive(Debug, Clone)]
pub struct OpenDbRequest {
    pub card_no: u16,
    pub mode: OpenMode,
    pub name: String,
}

impl OpenDbRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 3)?;
        let card_no = u16::from_be_bytes(data[0..2].try_into().unwrap());
        let mode = OpenMode::from_byte(data[2]);
        let (name, _) = decode_cstr(&data[3..])?;
        Ok(Self { card_no, mode, name })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.card_no.to_be_bytes().to_vec();
        out.push(self.mode.to_byte());
        encode_cstr(&mut out, &self.name);
        out
    }
}

#[derive(Debug, Clone)]
pub struct CreateDbRequest {
    pub creator: [u8; 4],
    pub dbtype: [u8; 4],
    pub card_no: u16,
    pub flags: u16,
    pub version: u16,
    pub name: String,
}

impl CreateDbRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 14)?;
        let creator = data[0..4].try_into().unwrap();
        let dbtype = data[4..8].try_into().unwrap();
        let card_no = u16::from_be_bytes(data[8..10].try_into().unwrap());
        let flags = u16::from_be_bytes(data[10..12].try_into().unwrap());
        let version = u16::from_be_bytes(data[12..14].try_into().unwrap());
        let (name, _) = decode_cstr(&data[14..])?;
        Ok(Self { creator, dbtype, card_no, flags, version, name })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.creator.to_vec();
        out.extend_from_slice(&self.dbtype);
        out.extend_from_slice(&self.card_no.to_be_bytes());
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.extend_from_slice(&self.version.to_be_bytes());
        encode_cstr(&mut out, &self.name);
        out
    }
}

#[derive(Debug, Clone)]
pub struct DeleteDbRequest {
    pub card_no: u16,
    pub name: String,
}

impl DeleteDbRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 2)?;
        let card_no = u16::from_be_bytes(data[0..2].try_into().unwrap());
        let (name, _) = decode_cstr(&data[2..])?;
        Ok(Self { card_no, name })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.card_no.to_be_bytes().to_vec();
        encode_cstr(&mut out, &self.name);
        out
    }
}

/// One catalog entry as listed by `ReadDbList` or returned whole by
/// `FindDb`.
#[derive(Debug, Clone)]
pub struct DbInfoEntry {
    pub card_no: u16,
    pub creator: [u8; 4],
    pub dbtype: [u8; 4],
    pub flags: u16,
    pub version: u16,
    pub mod_number: u32,
    pub creation_date: PalmDateTime,
    pub modification_date: PalmDateTime,
    pub backup_date: PalmDateTime,
    pub name: String,
}

impl DbInfoEntry {
    fn decode(data: &[u8]) -> Result<(Self, usize)> {
        let fixed_len = 2 + 4 + 4 + 2 + 2 + 4 + 3 * datetime::WIRE_SIZE;
        require_min_len(data, fixed_len)?;
        let card_no = u16::from_be_bytes(data[0..2].try_into().unwrap());
        let creator = data[2..6].try_into().unwrap();
        let dbtype = data[6..10].try_into().unwrap();
        let flags = u16::from_be_bytes(data[10..12].try_into().unwrap());
        let version = u16::from_be_bytes(data[12..14].try_into().unwrap());
        let mod_number = u32::from_be_bytes(data[14..18].try_into().unwrap());
        let mut offset = 18;
        let creation_date = PalmDateTime::decode(&data[offset..offset + datetime::WIRE_SIZE])?;
        offset += datetime::WIRE_SIZE;
        let modification_date = PalmDateTime::decode(&data[offset..offset + datetime::WIRE_SIZE])?;
        offset += datetime::WIRE_SIZE;
        let backup_date = PalmDateTime::decode(&data[offset..offset + datetime::WIRE_SIZE])?;
        offset += datetime::WIRE_SIZE;
        let (name, consumed) = decode_cstr(&data[offset..])?;
        offset += consumed;
        Ok((Self { card_no, creator, dbtype, flags, version, mod_number, creation_date, modification_date, backup_date, name }, offset))
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.card_no.to_be_bytes());
        out.extend_from_slice(&self.creator);
        out.extend_from_slice(&self.dbtype);
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.mod_number.to_be_bytes());
        for date in [self.creation_date, self.modification_date, self.backup_date] {
            let mut buf = [0u8; datetime::WIRE_SIZE];
            date.encode(&mut buf).expect("fixed-size buffer");
            out.extend_from_slice(&buf);
        }
        encode_cstr(out, &self.name);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadDbListRequest {
    pub card_no: u16,
    pub start_index: u16,
    pub flags: u8,
}

impl ReadDbListRequest {
    pub const WIRE_SIZE: usize = 5;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            card_no: u16::from_be_bytes(data[0..2].try_into().unwrap()),
            start_index: u16::from_be_bytes(data[2..4].try_into().unwrap()),
            flags: data[4],
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..2].copy_from_slice(&self.card_no.to_be_bytes());
        out[2..4].copy_from_slice(&self.start_index.to_be_bytes());
        out[4] = self.flags;
        out
    }
}

#[derive(Debug, Clone)]
pub struct ReadDbListResponse {
    pub last_index: u16,
    pub entries: Vec<DbInfoEntry>,
}

impl ReadDbListResponse {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 4)?;
        let last_index = u16::from_be_bytes(data[0..2].try_into().unwrap());
        let count = u16::from_be_bytes(data[2..4].try_into().unwrap()) as usize;
        let mut offset = 4;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let (entry, consumed) = DbInfoEntry::decode(&data[offset..])?;
            offset += consumed;
            entries.push(entry);
        }
        Ok(Self { last_index, entries })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.entries.len() > u16::MAX as usize {
            return Err(DlpError::ArgTooLarge(self.entries.len()));
        }
        let mut out = self.last_index.to_be_bytes().to_vec();
        out.extend_from_slice(&(self.entries.len() as u16).to_be_bytes());
        for entry in &self.entries {
            entry.encode(&mut out);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct FindDbRequest {
    pub card_no: u16,
    pub name: String,
}

impl FindDbRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 2)?;
        let card_no = u16::from_be_bytes(data[0..2].try_into().unwrap());
        let (name, _) = decode_cstr(&data[2..])?;
        Ok(Self { card_no, name })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.card_no.to_be_bytes().to_vec();
        encode_cstr(&mut out, &self.name);
        out
    }
}

#[derive(Debug, Clone)]
pub struct FindDbResponse {
    pub local_id: u32,
    pub open_count: u8,
    pub info: DbInfoEntry,
}

impl FindDbResponse {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 5)?;
        let local_id = u32::from_be_bytes(data[0..4].try_into().unwrap());
        let open_count = data[4];
        let (info, _) = DbInfoEntry::decode(&data[5..])?;
        Ok(Self { local_id, open_count, info })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.local_id.to_be_bytes().to_vec();
        out.push(self.open_count);
        self.info.encode(&mut out);
        out
    }
}

/// `SetDbInfo` updates a previously-opened database's metadata; `name`
/// left `None` leaves the stored name untouched.
#[derive(Debug, Clone)]
pub struct SetDbInfoRequest {
    pub handle: DbHandle,
    pub flags: u16,
    pub version: u16,
    pub creation_date: PalmDateTime,
    pub modification_date: PalmDateTime,
    pub backup_date: PalmDateTime,
    pub name: Option<String>,
}

impl SetDbInfoRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let fixed_len = 1 + 2 + 2 + 3 * datetime::WIRE_SIZE;
        require_min_len(data, fixed_len)?;
        let handle = DbHandle(data[0]);
        let flags = u16::from_be_bytes(data[1..3].try_into().unwrap());
        let version = u16::from_be_bytes(data[3..5].try_into().unwrap());
        let mut offset = 5;
        let creation_date = PalmDateTime::decode(&data[offset..offset + datetime::WIRE_SIZE])?;
        offset += datetime::WIRE_SIZE;
        let modification_date = PalmDateTime::decode(&data[offset..offset + datetime::WIRE_SIZE])?;
        offset += datetime::WIRE_SIZE;
        let backup_date = PalmDateTime::decode(&data[offset..offset + datetime::WIRE_SIZE])?;
        offset += datetime::WIRE_SIZE;
        let name = if data.len() > offset { Some(decode_cstr(&data[offset..])?.0) } else { None };
        Ok(Self { handle, flags, version, creation_date, modification_date, backup_date, name })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![self.handle.0];
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.extend_from_slice(&self.version.to_be_bytes());
        for date in [self.creation_date, self.modification_date, self.backup_date] {
            let mut buf = [0u8; datetime::WIRE_SIZE];
            date.encode(&mut buf).expect("fixed-size buffer");
            out.extend_from_slice(&buf);
        }
        if let Some(name) = &self.name {
            encode_cstr(&mut out, name);
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadOpenDbInfoResponse {
    pub num_records: u16,
}

impl ReadOpenDbInfoResponse {
    pub const WIRE_SIZE: usize = 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { num_records: u16::from_be_bytes(data[0..2].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.num_records.to_be_bytes()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OpenDbWithUniqueIdRequest {
    pub card_no: u16,
    pub unique_id: u32,
    pub mode: OpenMode,
}

impl OpenDbWithUniqueIdRequest {
    pub const WIRE_SIZE: usize = 2 + 4 + 1;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            card_no: u16::from_be_bytes(data[0..2].try_into().unwrap()),
            unique_id: u32::from_be_bytes(data[2..6].try_into().unwrap()),
            mode: OpenMode::from_byte(data[6]),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..2].copy_from_slice(&self.card_no.to_be_bytes());
        out[2..6].copy_from_slice(&self.unique_id.to_be_bytes());
        out[6] = self.mode.to_byte();
        out
    }
}

// --- Block I/O ---------------------------------------------------------

/// Argument shape shared by `ReadAppBlock` and `ReadSortBlock`: a handle
/// plus the byte range to read.
#[derive(Debug, Clone, Copy)]
pub struct BlockIoRequest {
    pub handle: DbHandle,
    pub offset: u16,
    pub length: u16,
}

impl BlockIoRequest {
    pub const WIRE_SIZE: usize = 1 + 2 + 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: DbHandle(data[0]),
            offset: u16::from_be_bytes(data[1..3].try_into().unwrap()),
            length: u16::from_be_bytes(data[3..5].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0] = self.handle.0;
        out[1..3].copy_from_slice(&self.offset.to_be_bytes());
        out[3..5].copy_from_slice(&self.length.to_be_bytes());
        out
    }
}

/// Argument shape shared by `WriteAppBlock` and `WriteSortBlock`.
#[derive(Debug, Clone)]
pub struct WriteBlockRequest {
    pub handle: DbHandle,
    pub data: Vec<u8>,
}

impl WriteBlockRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 1)?;
        Ok(Self { handle: DbHandle(data[0]), data: data[1..].to_vec() })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![self.handle.0];
        out.extend_from_slice(&self.data);
        out
    }
}

// --- Record I/O --------------------------------------------------------

/// The wire form of `ReadRecordById` / `WriteRecord`'s fixed-size record
/// header, shared by both directions of the call.
#[derive(Debug, Clone, Copy)]
pub struct RecordHeader {
    pub record_id: u32,
    pub index: u16,
    pub size: u16,
    pub attributes: u8,
    pub category: u8,
}

impl RecordHeader {
    pub const WIRE_SIZE: usize = 4 + 2 + 2 + 1 + 1;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            record_id: u32::from_be_bytes(data[0..4].try_into().unwrap()),
            index: u16::from_be_bytes(data[4..6].try_into().unwrap()),
            size: u16::from_be_bytes(data[6..8].try_into().unwrap()),
            attributes: data[8],
            category: data[9],
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.record_id.to_be_bytes());
        out[4..6].copy_from_slice(&self.index.to_be_bytes());
        out[6..8].copy_from_slice(&self.size.to_be_bytes());
        out[8] = self.attributes;
        out[9] = self.category;
        out
    }
}

/// Extracts a record's data bytes from the remainder of an argument view
/// that starts with [`RecordHeader::WIRE_SIZE`] bytes of header.
pub fn record_body<'a>(arg: &crate::args::ArgView<'a>) -> Result<&'a [u8]> {
    if arg.data.len() < RecordHeader::WIRE_SIZE {
        return Err(DlpError::Truncated);
    }
    Ok(&arg.data[RecordHeader::WIRE_SIZE..])
}

#[derive(Debug, Clone, Copy)]
pub struct ReadRecordByIdRequest {
    pub handle: DbHandle,
    pub record_id: u32,
    pub offset: u16,
    pub length: u16,
}

impl ReadRecordByIdRequest {
    pub const WIRE_SIZE: usize = 1 + 4 + 2 + 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: DbHandle(data[0]),
            record_id: u32::from_be_bytes(data[1..5].try_into().unwrap()),
            offset: u16::from_be_bytes(data[5..7].try_into().unwrap()),
            length: u16::from_be_bytes(data[7..9].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0] = self.handle.0;
        out[1..5].copy_from_slice(&self.record_id.to_be_bytes());
        out[5..7].copy_from_slice(&self.offset.to_be_bytes());
        out[7..9].copy_from_slice(&self.length.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadRecordByIndexRequest {
    pub handle: DbHandle,
    pub index: u16,
    pub offset: u16,
    pub length: u16,
}

impl ReadRecordByIndexRequest {
    pub const WIRE_SIZE: usize = 1 + 2 + 2 + 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: DbHandle(data[0]),
            index: u16::from_be_bytes(data[1..3].try_into().unwrap()),
            offset: u16::from_be_bytes(data[3..5].try_into().unwrap()),
            length: u16::from_be_bytes(data[5..7].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0] = self.handle.0;
        out[1..3].copy_from_slice(&self.index.to_be_bytes());
        out[3..5].copy_from_slice(&self.offset.to_be_bytes());
        out[5..7].copy_from_slice(&self.length.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WriteRecordResponse {
    pub record_id: u32,
}

impl WriteRecordResponse {
    pub const WIRE_SIZE: usize = 4;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { record_id: u32::from_be_bytes(data[0..4].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.record_id.to_be_bytes()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteRecordRequest {
    pub handle: DbHandle,
    pub flags: u8,
    pub record_id: u32,
}

impl DeleteRecordRequest {
    pub const WIRE_SIZE: usize = 1 + 1 + 4;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { handle: DbHandle(data[0]), flags: data[1], record_id: u32::from_be_bytes(data[2..6].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0] = self.handle.0;
        out[1] = self.flags;
        out[2..6].copy_from_slice(&self.record_id.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MoveCategoryRequest {
    pub handle: DbHandle,
    pub record_id: u32,
    pub to_category: u8,
}

impl MoveCategoryRequest {
    pub const WIRE_SIZE: usize = 1 + 4 + 1;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { handle: DbHandle(data[0]), record_id: u32::from_be_bytes(data[1..5].try_into().unwrap()), to_category: data[5] })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0] = self.handle.0;
        out[1..5].copy_from_slice(&self.record_id.to_be_bytes());
        out[5] = self.to_category;
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadRecordIdListRequest {
    pub handle: DbHandle,
    pub flags: u8,
    pub start_index: u16,
    pub max: u16,
}

impl ReadRecordIdListRequest {
    pub const WIRE_SIZE: usize = 1 + 1 + 2 + 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: DbHandle(data[0]),
            flags: data[1],
            start_index: u16::from_be_bytes(data[2..4].try_into().unwrap()),
            max: u16::from_be_bytes(data[4..6].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0] = self.handle.0;
        out[1] = self.flags;
        out[2..4].copy_from_slice(&self.start_index.to_be_bytes());
        out[4..6].copy_from_slice(&self.max.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone)]
pub struct ReadRecordIdListResponse {
    pub ids: Vec<u32>,
}

impl ReadRecordIdListResponse {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 2)?;
        let count = u16::from_be_bytes(data[0..2].try_into().unwrap()) as usize;
        require_len(&data[2..], count * 4)?;
        let ids = data[2..].chunks_exact(4).map(|c| u32::from_be_bytes(c.try_into().unwrap())).collect();
        Ok(Self { ids })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.ids.len() > u16::MAX as usize {
            return Err(DlpError::ArgTooLarge(self.ids.len()));
        }
        let mut out = (self.ids.len() as u16).to_be_bytes().to_vec();
        for id in &self.ids {
            out.extend_from_slice(&id.to_be_bytes());
        }
        Ok(out)
    }
}

/// Argument shape shared by `ReadNextRecInCategory` and
/// `ReadNextModifiedRecInCategory`.
#[derive(Debug, Clone, Copy)]
pub struct NextInCategoryRequest {
    pub handle: DbHandle,
    pub category: u8,
}

impl NextInCategoryRequest {
    pub const WIRE_SIZE: usize = 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { handle: DbHandle(data[0]), category: data[1] })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        [self.handle.0, self.category]
    }
}

// --- Resource I/O --------------------------------------------------------

/// `ReadResourceByIndex` / `WriteResource`'s fixed-size resource header,
/// the resource-fork analogue of [`RecordHeader`].
#[derive(Debug, Clone, Copy)]
pub struct ResourceHeader {
    pub res_type: [u8; 4],
    pub res_id: u16,
    pub index: u16,
    pub size: u16,
}

impl ResourceHeader {
    pub const WIRE_SIZE: usize = 4 + 2 + 2 + 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            res_type: data[0..4].try_into().unwrap(),
            res_id: u16::from_be_bytes(data[4..6].try_into().unwrap()),
            index: u16::from_be_bytes(data[6..8].try_into().unwrap()),
            size: u16::from_be_bytes(data[8..10].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.res_type);
        out[4..6].copy_from_slice(&self.res_id.to_be_bytes());
        out[6..8].copy_from_slice(&self.index.to_be_bytes());
        out[8..10].copy_from_slice(&self.size.to_be_bytes());
        out
    }
}

/// Extracts a resource's data bytes from the remainder of an argument view
/// that starts with [`ResourceHeader::WIRE_SIZE`] bytes of header.
pub fn resource_body<'a>(arg: &crate::args::ArgView<'a>) -> Result<&'a [u8]> {
    if arg.data.len() < ResourceHeader::WIRE_SIZE {
        return Err(DlpError::Truncated);
    }
    Ok(&arg.data[ResourceHeader::WIRE_SIZE..])
}

#[derive(Debug, Clone, Copy)]
pub struct ReadResourceByIndexRequest {
    pub handle: DbHandle,
    pub index: u16,
    pub offset: u16,
    pub length: u16,
}

impl ReadResourceByIndexRequest {
    pub const WIRE_SIZE: usize = 1 + 2 + 2 + 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: DbHandle(data[0]),
            index: u16::from_be_bytes(data[1..3].try_into().unwrap()),
            offset: u16::from_be_bytes(data[3..5].try_into().unwrap()),
            length: u16::from_be_bytes(data[5..7].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0] = self.handle.0;
        out[1..3].copy_from_slice(&self.index.to_be_bytes());
        out[3..5].copy_from_slice(&self.offset.to_be_bytes());
        out[5..7].copy_from_slice(&self.length.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteResourceRequest {
    pub handle: DbHandle,
    pub flags: u8,
    pub res_type: [u8; 4],
    pub res_id: u16,
}

impl DeleteResourceRequest {
    pub const WIRE_SIZE: usize = 1 + 1 + 4 + 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            handle: DbHandle(data[0]),
            flags: data[1],
            res_type: data[2..6].try_into().unwrap(),
            res_id: u16::from_be_bytes(data[6..8].try_into().unwrap()),
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0] = self.handle.0;
        out[1] = self.flags;
        out[2..6].copy_from_slice(&self.res_type);
        out[6..8].copy_from_slice(&self.res_id.to_be_bytes());
        out
    }
}

// --- App preferences -----------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct ReadAppPreferenceRequest {
    pub creator: [u8; 4],
    pub pref_id: u16,
    pub max_len: u16,
    pub flags: u8,
}

impl ReadAppPreferenceRequest {
    pub const WIRE_SIZE: usize = 4 + 2 + 2 + 1;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            creator: data[0..4].try_into().unwrap(),
            pref_id: u16::from_be_bytes(data[4..6].try_into().unwrap()),
            max_len: u16::from_be_bytes(data[6..8].try_into().unwrap()),
            flags: data[8],
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.creator);
        out[4..6].copy_from_slice(&self.pref_id.to_be_bytes());
        out[6..8].copy_from_slice(&self.max_len.to_be_bytes());
        out[8] = self.flags;
        out
    }
}

/// `ReadAppPreference`'s response header; the preference's own bytes travel
/// as a second, separately-framed argument group (schema declares 2
/// required groups) since its shape is opaque to DLP itself.
#[derive(Debug, Clone, Copy)]
pub struct ReadAppPreferenceResponse {
    pub version: u16,
    pub size: u16,
}

impl ReadAppPreferenceResponse {
    pub const WIRE_SIZE: usize = 4;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { version: u16::from_be_bytes(data[0..2].try_into().unwrap()), size: u16::from_be_bytes(data[2..4].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..2].copy_from_slice(&self.version.to_be_bytes());
        out[2..4].copy_from_slice(&self.size.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WriteAppPreferenceHeader {
    pub creator: [u8; 4],
    pub pref_id: u16,
    pub version: u16,
    pub flags: u8,
}

impl WriteAppPreferenceHeader {
    pub const WIRE_SIZE: usize = 4 + 2 + 2 + 1;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self {
            creator: data[0..4].try_into().unwrap(),
            pref_id: u16::from_be_bytes(data[4..6].try_into().unwrap()),
            version: u16::from_be_bytes(data[6..8].try_into().unwrap()),
            flags: data[8],
        })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[0..4].copy_from_slice(&self.creator);
        out[4..6].copy_from_slice(&self.pref_id.to_be_bytes());
        out[6..8].copy_from_slice(&self.version.to_be_bytes());
        out[8] = self.flags;
        out
    }
}

// --- NetSync info --------------------------------------------------------

/// Shared shape of `ReadNetSyncInfo` and `WriteNetSyncInfo`: the device's
/// LAN sync settings.
#[derive(Debug, Clone)]
pub struct NetSyncInfo {
    pub lan_sync_enabled: bool,
    pub host_name: String,
    pub host_address: String,
    pub host_subnet_mask: String,
}

impl NetSyncInfo {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 1)?;
        let lan_sync_enabled = data[0] != 0;
        let (host_name, n1) = decode_cstr(&data[1..])?;
        let (host_address, n2) = decode_cstr(&data[1 + n1..])?;
        let (host_subnet_mask, _) = decode_cstr(&data[1 + n1 + n2..])?;
        Ok(Self { lan_sync_enabled, host_name, host_address, host_subnet_mask })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![self.lan_sync_enabled as u8];
        encode_cstr(&mut out, &self.host_name);
        encode_cstr(&mut out, &self.host_address);
        encode_cstr(&mut out, &self.host_subnet_mask);
        out
    }
}

// --- Conduit boundary -----------------------------------------------------

#[derive(Debug, Clone)]
pub struct CallApplicationRequest {
    pub creator: [u8; 4],
    pub action: u16,
    pub data: Vec<u8>,
}

impl CallApplicationRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 6)?;
        Ok(Self { creator: data[0..4].try_into().unwrap(), action: u16::from_be_bytes(data[4..6].try_into().unwrap()), data: data[6..].to_vec() })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.creator.to_vec();
        out.extend_from_slice(&self.action.to_be_bytes());
        out.extend_from_slice(&self.data);
        out
    }
}

/// Opaque result blob shared by `CallApplication` and the legacy
/// `ProcessRpc` bridge — neither response has a shape DLP itself
/// interprets.
#[derive(Debug, Clone)]
pub struct OpaqueResult {
    pub data: Vec<u8>,
}

impl OpaqueResult {
    pub fn decode(data: &[u8]) -> Result<Self> {
        Ok(Self { data: data.to_vec() })
    }

    pub fn encode(&self) -> Vec<u8> {
        self.data.clone()
    }
}

#[derive(Debug, Clone)]
pub struct ProcessRpcRequest {
    pub trap_id: u16,
    pub data: Vec<u8>,
}

impl ProcessRpcRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        require_min_len(data, 2)?;
        Ok(Self { trap_id: u16::from_be_bytes(data[0..2].try_into().unwrap()), data: data[2..].to_vec() })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.trap_id.to_be_bytes().to_vec();
        out.extend_from_slice(&self.data);
        out
    }
}

/// `ReadTetheredAppInfo` / `WriteTetheredAppInfo`'s argument: per-platform
/// tethering metadata DLP carries but does not interpret.
#[derive(Debug, Clone)]
pub struct TetheredAppInfo {
    pub data: Vec<u8>,
}

impl TetheredAppInfo {
    pub fn decode(data: &[u8]) -> Result<Self> {
        Ok(Self { data: data.to_vec() })
    }

    pub fn encode(&self) -> Vec<u8> {
        self.data.clone()
    }
}

// --- Sync control -----------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct EndOfSyncRequest {
    pub status: u16,
}

impl EndOfSyncRequest {
    pub const WIRE_SIZE: usize = 2;

    pub fn decode(data: &[u8]) -> Result<Self> {
        require_len(data, Self::WIRE_SIZE)?;
        Ok(Self { status: u16::from_be_bytes(data[0..2].try_into().unwrap()) })
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        self.status.to_be_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct AddSyncLogEntryRequest {
    pub text: String,
}

impl AddSyncLogEntryRequest {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (text, _) = decode_cstr(data)?;
        Ok(Self { text })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_cstr(&mut out, &self.text);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_ids_round_trip_through_from_u8() {
        assert_eq!(DlpFunction::from_u8(0x20), Some(DlpFunction::ReadRecordById));
        assert_eq!(DlpFunction::ReadRecordById.id(), 0x20);
        assert_eq!(DlpFunction::ReadRecordById.category(), DlpCategory::RecordIo);
        assert_eq!(DlpFunction::from_u8(0x62), None);
    }

    #[test]
    fn every_function_id_has_a_schema() {
        for id in 0x10u8..=0x61 {
            let func = DlpFunction::from_u8(id).unwrap();
            let _ = func.request_schema();
            let _ = func.response_schema();
        }
    }

    #[test]
    fn open_mode_round_trips_through_a_byte() {
        let mode = OpenMode { read: true, write: true, exclusive: false, show_secret: true };
        let decoded = OpenMode::from_byte(mode.to_byte());
        assert!(decoded.read && decoded.write && decoded.show_secret && !decoded.exclusive);
    }

    #[test]
    fn record_header_round_trips() {
        let header = RecordHeader { record_id: 0x00112233, index: 4, size: 12, attributes: 0x20, category: 3 };
        let decoded = RecordHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded.record_id, header.record_id);
        assert_eq!(decoded.category, 3);
    }

    #[test]
    fn resource_header_round_trips() {
        let header = ResourceHeader { res_type: *b"tAIB", res_id: 1000, index: 2, size: 48 };
        let decoded = ResourceHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded.res_type, header.res_type);
        assert_eq!(decoded.res_id, 1000);
    }

    #[test]
    fn sys_info_rejects_wrong_length() {
        assert!(SysInfo::decode(&[0u8; 3]).is_err());
    }

    #[test]
    fn write_user_info_only_encodes_present_fields() {
        let req = WriteUserInfoRequest { user_name: Some("alice".into()), ..Default::default() };
        let encoded = req.encode();
        let decoded = WriteUserInfoRequest::decode(&encoded).unwrap();
        assert_eq!(decoded.user_name, Some("alice".into()));
        assert!(decoded.user_id.is_none());
        assert!(decoded.last_sync_time.is_none());
    }

    #[test]
    fn db_list_response_round_trips_several_entries() {
        let entry = DbInfoEntry {
            card_no: 0,
            creator: *b"appl",
            dbtype: *b"DATA",
            flags: 0,
            version: 1,
            mod_number: 7,
            creation_date: PalmDateTime::UNSET,
            modification_date: PalmDateTime::UNSET,
            backup_date: PalmDateTime::UNSET,
            name: "AddressDB".into(),
        };
        let resp = ReadDbListResponse { last_index: 0, entries: vec![entry.clone(), entry] };
        let decoded = ReadDbListResponse::decode(&resp.encode().unwrap()).unwrap();
        assert_eq!(decoded.entries.len(), 2);
        assert_eq!(decoded.entries[0].name, "AddressDB");
    }

    #[test]
    fn record_id_list_response_round_trips() {
        let resp = ReadRecordIdListResponse { ids: vec![1, 2, 3] };
        let decoded = ReadRecordIdListResponse::decode(&resp.encode().unwrap()).unwrap();
        assert_eq!(decoded.ids, vec![1, 2, 3]);
    }
}
