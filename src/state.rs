use crate::config::{PROFILE_GROUPS, REMOTE_MAX_KEYS};

/// Video input sources
#[derive(strum::FromRepr, strum::Display, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum AvInput {
    #[default]
    Keep = 0,
    Av1Rgbs,
    Av1Rgsb,
    Av1Ypbpr,
    Av1Rgbhv,
    Av1Rgbcs,
    Av2Ypbpr,
    Av2Rgsb,
    Av3Rgbhv,
    Av3Rgbcs,
    Av3Rgbs,
    Av3Rgsb,
    Av3Ypbpr,
}

/// Live device configuration read by `save` and updated by `load`.
///
/// `A` is the AV configuration block and `V` a video mode descriptor, both
/// owned by the video pipeline and persisted verbatim in profile records.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigState<A, V, const MODES: usize> {
    /// Selected profile per input group
    pub profile_sel: [u8; PROFILE_GROUPS],
    /// Profiles are grouped per input when set
    pub profile_mode: bool,
    /// Input to switch to
    pub target_input: AvInput,
    /// Remote control key codes
    pub keymap: [u16; REMOTE_MAX_KEYS],
    pub avconfig: A,
    pub video_modes: [V; MODES],
    /// Set after a profile load, the active video mode has to be recomputed
    pub update_cur_vm: bool,
}

impl<A, V, const MODES: usize> ConfigState<A, V, MODES> {
    /// Create a state with default selections around the provided blocks
    pub fn new(avconfig: A, video_modes: [V; MODES]) -> Self {
        Self {
            profile_sel: [0; PROFILE_GROUPS],
            profile_mode: false,
            target_input: AvInput::Keep,
            keymap: [0; REMOTE_MAX_KEYS],
            avconfig,
            video_modes,
            update_cur_vm: false,
        }
    }
}
