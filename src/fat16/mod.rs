//! Virtual FAT16 volume exporting the profile area as a single file
//!
//! Nothing here reads a real filesystem. The boot sector, the FAT and the
//! root directory entry are generated from the fixed volume geometry below,
//! one sector at a time.

mod boot;
pub use boot::{generate_boot_sector, FatBootBlock, PROFILE_BOOT_BLOCK};

mod table;
pub use table::{generate_fat16, FatChunks, END_OF_CHAIN, FAT16_PREAMBLE};

mod dir;
pub use dir::{fat_date, fat_time, profile_dirent, Attrs, DirectoryEntry, PROFILE_DIRENT};

mod volume;
pub use volume::ProfileVolume;

/// Bytes per volume sector
pub const SECTOR_SIZE: usize = 512;

/// FAT16 entries held by one sector
pub const FAT16_ENTRIES_PER_SECTOR: usize = SECTOR_SIZE / 2;

/// Clusters allocated to the exported file
pub const PROF_16_CLUSTER_COUNT: u16 = 512;

/// First data cluster index
pub const FIRST_CLUSTER: u16 = 2;

/// Fixed single file volume geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_copies: u8,
    pub root_entries: u16,
    pub total_sectors: u16,
    pub sectors_per_fat: u16,
}

/// Geometry of the exported profile volume
pub const PROFILE_VOLUME: Geometry = Geometry {
    sectors_per_cluster: 4,
    reserved_sectors: 128,
    fat_copies: 2,
    root_entries: 2048,
    total_sectors: 32768,
    sectors_per_fat: 32,
};

impl Geometry {
    /// Bytes per cluster
    pub const fn cluster_size(&self) -> u32 {
        self.sectors_per_cluster as u32 * SECTOR_SIZE as u32
    }

    /// Size of the exported file
    pub const fn file_size(&self) -> u32 {
        PROF_16_CLUSTER_COUNT as u32 * self.cluster_size()
    }

    /// Sectors occupied by the root directory
    pub const fn root_dir_sectors(&self) -> u32 {
        self.root_entries as u32 * 32 / SECTOR_SIZE as u32
    }

    /// Calculate FAT0 start
    pub const fn start_fat0(&self) -> u32 {
        self.reserved_sectors as u32
    }

    /// Calculate FAT1 start
    pub const fn start_fat1(&self) -> u32 {
        self.start_fat0() + self.sectors_per_fat as u32
    }

    /// Calculate ROOTDIR start
    pub const fn start_rootdir(&self) -> u32 {
        self.start_fat0() + self.fat_copies as u32 * self.sectors_per_fat as u32
    }

    /// Calculate cluster start
    pub const fn start_clusters(&self) -> u32 {
        self.start_rootdir() + self.root_dir_sectors()
    }

    /// Number of data clusters on the volume
    pub const fn data_clusters(&self) -> u32 {
        (self.total_sectors as u32 - self.start_clusters()) / self.sectors_per_cluster as u32
    }
}
