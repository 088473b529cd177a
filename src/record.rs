//! Userdata record layouts and codec
//!
//! Every record starts with a [`UserdataHeader`]. Layouts are little endian
//! with fixed byte offsets:
//!
//! ```text
//! header       0  key[8]  8 version_major  9 version_minor  10 record_type:u32
//! init config  14 data_len:u16  16 last_profile[3]  19 profile_mode
//!              20 last_input:u32  24 keys[REMOTE_MAX_KEYS]:u16
//! profile      14 avc_data_len:u16  16 vm_data_len:u16  18 avc  .. vm[MODES]
//! ```
//!
//! Decoding validates the header, then every length field, before anything is
//! applied to the live [`ConfigState`], so a rejected record never leaves a
//! partial update behind.

use packing::{Packed, PackedSize};

use crate::config::{
    Version, MAX_PROFILE, PROFILE_GROUPS, PROFILE_GROUP_SIZE, REMOTE_MAX_KEYS, USERDATA_KEY,
};
use crate::persist::{Persist, Sink, Source};
use crate::state::{AvInput, ConfigState};
use crate::{Error, RecordError};

/// Record kinds stored in the userdata area
#[derive(strum::FromRepr, strum::Display, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum RecordType {
    InitConfig = 0,
    Profile = 1,
}

impl RecordType {
    /// Kind of record held by a slot
    pub const fn for_slot(slot: u8) -> Self {
        if slot > MAX_PROFILE {
            RecordType::InitConfig
        } else {
            RecordType::Profile
        }
    }
}

/// Common record header
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[packed(little_endian, lsb0)]
pub struct UserdataHeader {
    #[pkd(7, 0, 0, 7)]
    pub key: [u8; 8],

    #[pkd(7, 0, 8, 8)]
    pub version_major: u8,

    #[pkd(7, 0, 9, 9)]
    pub version_minor: u8,

    #[pkd(7, 0, 10, 13)]
    pub record_type: u32,
}

impl UserdataHeader {
    pub fn new(version: Version, kind: RecordType) -> Self {
        Self {
            key: USERDATA_KEY,
            version_major: version.major,
            version_minor: version.minor,
            record_type: kind as u32,
        }
    }

    pub fn version(&self) -> Version {
        Version::new(self.version_major, self.version_minor)
    }

    /// Validate key, version and type in that order
    pub fn check(&self, version: Version, expected: RecordType) -> Result<RecordType, RecordError> {
        if self.key != USERDATA_KEY {
            return Err(RecordError::MagicMismatch);
        }

        if self.version() != version {
            return Err(RecordError::VersionMismatch {
                expected: version,
                found: self.version(),
            });
        }

        match RecordType::from_repr(self.record_type) {
            Some(kind) if kind == expected => Ok(kind),
            _ => Err(RecordError::UnknownType(self.record_type)),
        }
    }
}

/// Init config fields following the header
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(little_endian, lsb0)]
pub struct InitConfigFields {
    #[pkd(7, 0, 0, 1)]
    pub data_len: u16,

    #[pkd(7, 0, 2, 4)]
    pub last_profile: [u8; 3],

    #[pkd(7, 0, 5, 5)]
    pub profile_mode: u8,

    #[pkd(7, 0, 6, 9)]
    pub last_input: u32,
}

/// Profile length fields following the header
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(little_endian, lsb0)]
pub struct ProfileLengths {
    #[pkd(7, 0, 0, 1)]
    pub avc_data_len: u16,

    #[pkd(7, 0, 2, 3)]
    pub vm_data_len: u16,
}

/// Encoded header length
pub const HEADER_LEN: usize = <UserdataHeader as PackedSize>::BYTES;

/// Encoded init config record length
pub const INIT_CONFIG_LEN: usize = HEADER_LEN
    + <InitConfigFields as PackedSize>::BYTES
    + <[u16; REMOTE_MAX_KEYS] as Persist>::SIZE;

/// Init config `data_len`, counted from `last_profile` to the end of the record
pub const INIT_CONFIG_DATA_LEN: u16 = (INIT_CONFIG_LEN - HEADER_LEN - 2) as u16;

/// Encoded profile record length
pub const fn profile_len<A: Persist, V: Persist, const MODES: usize>() -> usize {
    HEADER_LEN + <ProfileLengths as PackedSize>::BYTES + A::SIZE + V::SIZE * MODES
}

/// Encoded length of a record kind
pub const fn record_len<A: Persist, V: Persist, const MODES: usize>(kind: RecordType) -> usize {
    match kind {
        RecordType::InitConfig => INIT_CONFIG_LEN,
        RecordType::Profile => profile_len::<A, V, MODES>(),
    }
}

/// Default selection for a profile group
pub const fn default_profile(group: usize) -> u8 {
    group as u8 * PROFILE_GROUP_SIZE
}

/// Clamp a stored profile selection to the valid range for its group,
/// falling back to the group default
pub fn sanitize_profile(group: usize, profile: u8, grouped: bool) -> u8 {
    let (min, max) = if grouped {
        let min = default_profile(group);
        (min, min + PROFILE_GROUP_SIZE - 1)
    } else {
        (0, MAX_PROFILE)
    };

    if (min..=max).contains(&profile) {
        profile
    } else {
        default_profile(group)
    }
}

fn put_packed<S: Sink, P: Packed, const N: usize>(sink: &mut S, p: &P) -> Result<(), Error> {
    let mut b = [0u8; N];
    p.pack(&mut b).map_err(|_| Error::Layout)?;
    sink.put(&b)
}

fn take_packed<S: Source, P: Packed, const N: usize>(source: &mut S) -> Result<P, Error> {
    let mut b = [0u8; N];
    source.take(&mut b)?;
    P::unpack(&b).map_err(|_| Error::Layout)
}

/// Read and unpack a record header
pub fn decode_header<S: Source>(source: &mut S) -> Result<UserdataHeader, Error> {
    take_packed::<S, UserdataHeader, HEADER_LEN>(source)
}

/// Encode the init config record for the live state
pub fn encode_init_config<S: Sink, A, V, const MODES: usize>(
    sink: &mut S,
    version: Version,
    state: &ConfigState<A, V, MODES>,
) -> Result<(), Error> {
    let hdr = UserdataHeader::new(version, RecordType::InitConfig);
    put_packed::<S, _, HEADER_LEN>(sink, &hdr)?;

    let fields = InitConfigFields {
        data_len: INIT_CONFIG_DATA_LEN,
        last_profile: state.profile_sel,
        profile_mode: state.profile_mode as u8,
        last_input: state.target_input as u32,
    };
    put_packed::<S, _, { <InitConfigFields as PackedSize>::BYTES }>(sink, &fields)?;

    state.keymap.persist(sink)
}

/// Encode a profile record for the live state
pub fn encode_profile<S: Sink, A: Persist, V: Persist, const MODES: usize>(
    sink: &mut S,
    version: Version,
    state: &ConfigState<A, V, MODES>,
) -> Result<(), Error> {
    let hdr = UserdataHeader::new(version, RecordType::Profile);
    put_packed::<S, _, HEADER_LEN>(sink, &hdr)?;

    let lengths = ProfileLengths {
        avc_data_len: A::SIZE as u16,
        vm_data_len: (V::SIZE * MODES) as u16,
    };
    put_packed::<S, _, { <ProfileLengths as PackedSize>::BYTES }>(sink, &lengths)?;

    state.avconfig.persist(sink)?;
    state.video_modes.persist(sink)
}

/// Encode the record of the provided kind
pub fn encode<S: Sink, A: Persist, V: Persist, const MODES: usize>(
    sink: &mut S,
    version: Version,
    kind: RecordType,
    state: &ConfigState<A, V, MODES>,
) -> Result<(), Error> {
    match kind {
        RecordType::InitConfig => encode_init_config(sink, version, state),
        RecordType::Profile => encode_profile(sink, version, state),
    }
}

/// Decode an init config payload (following the header) into the live state
pub fn decode_init_config<S: Source, A, V, const MODES: usize>(
    source: &mut S,
    state: &mut ConfigState<A, V, MODES>,
) -> Result<(), Error> {
    let fields: InitConfigFields =
        take_packed::<S, _, { <InitConfigFields as PackedSize>::BYTES }>(source)?;

    if fields.data_len != INIT_CONFIG_DATA_LEN {
        crate::warn!(
            "Init config length {} does not match expected {}",
            fields.data_len,
            INIT_CONFIG_DATA_LEN
        );
        return Err(RecordError::LengthMismatch {
            expected: INIT_CONFIG_DATA_LEN,
            found: fields.data_len,
        }
        .into());
    }

    let mut keys = [0u16; REMOTE_MAX_KEYS];
    keys.restore(source)?;

    let grouped = fields.profile_mode != 0;
    let mut profile_sel = [0u8; PROFILE_GROUPS];
    for (i, p) in profile_sel.iter_mut().enumerate() {
        *p = sanitize_profile(i, fields.last_profile[i], grouped);
        if *p != fields.last_profile[i] {
            crate::debug!(
                "Stored profile {} for group {} out of range, using {}",
                fields.last_profile[i],
                i,
                *p
            );
        }
    }

    state.profile_mode = grouped;
    state.profile_sel = profile_sel;
    // Unknown inputs keep the current target
    if let Some(input) = AvInput::from_repr(fields.last_input) {
        state.target_input = input;
    }
    state.keymap = keys;

    Ok(())
}

/// Decode a profile payload (following the header) into the live state
pub fn decode_profile<S: Source, A, V, const MODES: usize>(
    source: &mut S,
    state: &mut ConfigState<A, V, MODES>,
) -> Result<(), Error>
where
    A: Persist + Clone,
    V: Persist + Clone,
{
    let lengths: ProfileLengths =
        take_packed::<S, _, { <ProfileLengths as PackedSize>::BYTES }>(source)?;

    let avc_len = A::SIZE as u16;
    if lengths.avc_data_len != avc_len {
        crate::warn!(
            "AV config length {} does not match expected {}",
            lengths.avc_data_len,
            avc_len
        );
        return Err(RecordError::LengthMismatch {
            expected: avc_len,
            found: lengths.avc_data_len,
        }
        .into());
    }

    let vm_len = (V::SIZE * MODES) as u16;
    if lengths.vm_data_len != vm_len {
        crate::warn!(
            "Video mode length {} does not match expected {}",
            lengths.vm_data_len,
            vm_len
        );
        return Err(RecordError::LengthMismatch {
            expected: vm_len,
            found: lengths.vm_data_len,
        }
        .into());
    }

    // Restore into copies so a read failure leaves the live state intact
    let mut avconfig = state.avconfig.clone();
    avconfig.restore(source)?;

    let mut video_modes = state.video_modes.clone();
    video_modes.restore(source)?;

    state.avconfig = avconfig;
    state.video_modes = video_modes;
    state.update_cur_vm = true;

    Ok(())
}

/// Validate a header against the running firmware and decode the payload
pub fn decode<S: Source, A, V, const MODES: usize>(
    source: &mut S,
    version: Version,
    kind: RecordType,
    state: &mut ConfigState<A, V, MODES>,
) -> Result<(), Error>
where
    A: Persist + Clone,
    V: Persist + Clone,
{
    let hdr = decode_header(source)?;
    hdr.check(version, kind)?;

    match kind {
        RecordType::InitConfig => decode_init_config(source, state),
        RecordType::Profile => decode_profile(source, state),
    }
}
