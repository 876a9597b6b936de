//! Arcade Learning Environment backend.
//!
//! ROM images are loaded from the directory given by the environment variable
//! `ATARI_ROM_DIR`. An easy way to get them is the
//! [AutoROM](https://pypi.org/project/AutoROM/) Python package:
//!
//! ```bash
//! pip install autorom
//! mkdir $HOME/atari_rom
//! AutoROM --install-dir $HOME/atari_rom
//! export ATARI_ROM_DIR=$HOME/atari_rom
//! ```
use crate::{games, AtariAction, AtariBackend, AtariConfig, AtariEnv, ATARI_GAMES};
use anyhow::{Context, Result};
use flowenv_core::{error::FlowEnvError, registry::Registry};
use log::info;
use std::{
    env,
    ffi::CString,
    path::{Path, PathBuf},
};

/// Returns the path of the ROM image of a game.
pub fn rom_path(id: &str) -> Result<PathBuf> {
    let rom_dir = env::var("ATARI_ROM_DIR").map_err(|_| {
        FlowEnvError::ConstructionError("ATARI_ROM_DIR is not set".to_string())
    })?;
    let name = games::rom_name(id).ok_or_else(|| {
        FlowEnvError::ConstructionError(format!("unknown Atari game: {:?}", id))
    })?;
    let path = Path::new(&rom_dir).join(name);
    if !path.exists() {
        return Err(
            FlowEnvError::ConstructionError(format!("ROM image {:?} not found", path)).into(),
        );
    }
    Ok(path)
}

/// An emulator instance of the Arcade Learning Environment.
pub struct AleBackend {
    inner: *mut atari_env_sys::ALEInterface,
    rom_path: CString,
}

// The interface is owned by a single backend and never aliased.
unsafe impl Send for AleBackend {}

impl Drop for AleBackend {
    fn drop(&mut self) {
        unsafe {
            atari_env_sys::ALE_del(self.inner);
        }
    }
}

impl AleBackend {
    /// Loads a ROM image. Frame skip and sticky actions are disabled.
    pub fn new(rom_path: &Path) -> Result<Self> {
        let rom_path = CString::new(
            rom_path
                .to_str()
                .context("ROM path is not valid UTF-8")?,
        )?;
        let inner = unsafe { atari_env_sys::ALE_new() };
        let backend = Self { inner, rom_path };
        backend.load(0)?;
        info!("Loaded ROM {:?}", backend.rom_path);
        Ok(backend)
    }

    // Settings take effect when the ROM is loaded.
    fn load(&self, seed: i32) -> Result<()> {
        let random_seed = CString::new("random_seed")?;
        let frame_skip = CString::new("frame_skip")?;
        let repeat_action_probability = CString::new("repeat_action_probability")?;
        unsafe {
            atari_env_sys::setInt(self.inner, random_seed.as_ptr(), seed);
            atari_env_sys::setInt(self.inner, frame_skip.as_ptr(), 1);
            atari_env_sys::setFloat(self.inner, repeat_action_probability.as_ptr(), 0.0);
            atari_env_sys::loadROM(self.inner, self.rom_path.as_ptr());
            atari_env_sys::reset_game(self.inner);
        }
        Ok(())
    }
}

impl AtariBackend for AleBackend {
    fn width(&self) -> usize {
        unsafe { atari_env_sys::getScreenWidth(self.inner) as usize }
    }

    fn height(&self) -> usize {
        unsafe { atari_env_sys::getScreenHeight(self.inner) as usize }
    }

    fn minimal_actions(&self) -> Vec<AtariAction> {
        let n = unsafe { atari_env_sys::getMinimalActionSize(self.inner) } as usize;
        let mut buf = vec![0i32; n];
        unsafe {
            atari_env_sys::getMinimalActionSet(self.inner, buf.as_mut_ptr());
        }
        buf.into_iter().filter_map(AtariAction::from_i32).collect()
    }

    fn act(&mut self, action: AtariAction) -> i32 {
        unsafe { atari_env_sys::act(self.inner, action as i32) as i32 }
    }

    fn lives(&self) -> usize {
        unsafe { atari_env_sys::lives(self.inner) as usize }
    }

    fn is_game_over(&self) -> bool {
        unsafe { atari_env_sys::game_over(self.inner) }
    }

    fn reset(&mut self) {
        unsafe {
            atari_env_sys::reset_game(self.inner);
        }
    }

    fn render_rgb24(&self, buf: &mut [u8]) {
        unsafe {
            atari_env_sys::getScreenRGB2(self.inner, buf.as_mut_ptr());
        }
    }

    fn seed(&mut self, seed: u64) {
        // ALE takes a 31 bit seed.
        let seed = (seed % (i32::MAX as u64)) as i32;
        if let Err(e) = self.load(seed) {
            log::warn!("Failed to reseed ALE: {}", e);
        }
    }
}

/// Returns a registry of all [`ATARI_GAMES`] preprocessed with `config`.
pub fn atari_registry(config: AtariConfig) -> Registry<AtariEnv<AleBackend>> {
    let mut registry = Registry::default();
    for id in ATARI_GAMES {
        let config = config.clone();
        registry.register(id, move |adapter_config| {
            let backend = AleBackend::new(&rom_path(&adapter_config.name)?)?;
            AtariEnv::build(backend, &config, adapter_config)
        });
    }
    registry
}
