//! Flash userdata persistence and FAT16 profile export for embedded video processors
//!
//! Device configuration (profiles and the init configuration) is stored as
//! fixed layout, versioned records in a slot indexed flash area using a
//! single page sized scratch buffer, see [`Userdata`]. The same area can be
//! presented to a USB host as a read only FAT16 volume holding one file, see
//! [`fat16::ProfileVolume`], without ever materialising the FAT in memory.

#![cfg_attr(not(feature="std"), no_std)]

#[cfg(feature = "defmt")]
#[allow(unused_imports)]
use defmt::{debug, info, trace, warn, error};

#[cfg(not(feature = "defmt"))]
#[allow(unused_imports)]
use log::{debug, info, trace, warn, error};

mod config;
pub use config::{
    StoreConfig, Version, INIT_CONFIG_SLOT, MAX_PROFILE, MAX_USERDATA_ENTRY, PAGE_SIZE,
    PROFILE_GROUPS, PROFILE_GROUP_SIZE, REMOTE_MAX_KEYS, USERDATA_KEY,
};

mod error;
pub use error::{Error, RecordError};

mod persist;
pub use persist::{Persist, Sink, SliceSink, SliceSource, Source};

mod state;
pub use state::{AvInput, ConfigState};

pub mod flash;

pub mod transfer;

pub mod record;
pub use record::RecordType;

mod store;
pub use store::Userdata;

pub mod fat16;
