// Copyright (c) 2017, 2018, 2023 Marek Benc <benc.marek.elektro98@proton.me>
//
// Permission to use, copy, modify, and distribute this software for any
// purpose with or without fee is hereby granted, provided that the above
// copyright notice and this permission notice appear in all copies.
//
// THE SOFTWARE IS PROVIDED "AS IS" AND THE AUTHOR DISCLAIMS ALL WARRANTIES
// WITH REGARD TO THIS SOFTWARE INCLUDING ALL IMPLIED WARRANTIES OF
// MERCHANTABILITY AND FITNESS. IN NO EVENT SHALL THE AUTHOR BE LIABLE FOR
// ANY SPECIAL, DIRECT, INDIRECT, OR CONSEQUENTIAL DAMAGES OR ANY DAMAGES
// WHATSOEVER RESULTING FROM LOSS OF USE, DATA OR PROFITS, WHETHER IN AN
// ACTION OF CONTRACT, NEGLIGENCE OR OTHER TORTIOUS ACTION, ARISING OUT OF
// OR IN CONNECTION WITH THE USE OR PERFORMANCE OF THIS SOFTWARE.
//

// Command-line parsing (getopts) and ROM-directory resolution (home), the
// same two crates the flat legacy build used for its own `-c`/rom-select
// flags and `get_default_config_dir_path`. We don't carry over the
// teacher's hand-rolled INI config file -- model/ROM selection is small
// enough to live entirely on the command line.

use std::fs;
use std::io;
use std::path::PathBuf;

use log::{info, warn};

use zxs_core::zx::models::{self, ModelInfo, ModelKind};

const UNIX_HIDDEN_DIR_NAME: &str = ".zxs";
const WINDOWS_DEV_NAME:     &str = "zxs";
const WINDOWS_PROJ_NAME:    &str = "roms";

pub fn build_options() -> getopts::Options {
    let mut options = getopts::Options::new();
    options.optopt("m", "model", "Select the machine model (16k, 48k, 48k3, plus, 128k-en, 128k-es, inves). Default: 48k.", "MODEL");
    options.optopt("r", "rom-dir", "Override the default ROM directory.", "PATH");
    options.optopt("s", "scale", "Integer pixel scale factor for the window. Default: 2.", "N");
    options.optflag("f", "fullscreen", "Start in fullscreen mode.");
    options.optflag("a", "mute", "Disable audio output.");
    options.optflag("h", "help", "Show this help listing.");
    options
}

#[cfg(target_os = "windows")]
pub fn default_rom_dir() -> PathBuf {
    let mut dir = std::env::var_os("AppData").map(PathBuf::from).expect("failed to find the %AppData% directory");
    dir.push(WINDOWS_DEV_NAME);
    dir.push(WINDOWS_PROJ_NAME);
    dir
}
#[cfg(not(target_os = "windows"))]
pub fn default_rom_dir() -> PathBuf {
    let mut dir = home::home_dir().expect("failed to find the home directory");
    dir.push(UNIX_HIDDEN_DIR_NAME);
    dir
}

fn parse_model(name: &str) -> Option<ModelKind> {
    match name {
        "16k"     => Some(ModelKind::Spectrum16kIssue1),
        "48k"     => Some(ModelKind::Spectrum48kIssue2),
        "48k3"    => Some(ModelKind::Spectrum48kIssue3),
        "plus"    => Some(ModelKind::SpectrumPlus),
        "128k-en" => Some(ModelKind::SpectrumPlus128kEn),
        "128k-es" => Some(ModelKind::SpectrumPlus128kEs),
        "inves"   => Some(ModelKind::InvesSpectrumPlus),
        _         => None,
    }
}

pub struct Settings {
    pub model:       &'static ModelInfo,
    pub rom_dir:     PathBuf,
    pub scale:       u32,
    pub fullscreen:  bool,
    pub mute:        bool,
}

impl Settings {
    pub fn from_matches(matches: &getopts::Matches) -> Option<Settings> {
        let kind = match matches.opt_str("m") {
            Some(name) => match parse_model(&name) {
                Some(kind) => kind,
                None => {
                    println!("Unrecognized model `{}'. Run with --help to see the supported names.", name);
                    return None;
                },
            },
            None => ModelKind::Spectrum48kIssue2,
        };
        let rom_dir = matches.opt_str("r").map(PathBuf::from).unwrap_or_else(default_rom_dir);
        let scale = match matches.opt_str("s") {
            Some(text) => match text.parse() {
                Ok(n) if n > 0 => n,
                _ => {
                    println!("Invalid scale factor `{}'; must be a positive integer.", text);
                    return None;
                },
            },
            None => 2,
        };

        Some(Settings {
            model: models::lookup(kind),
            rom_dir,
            scale,
            fullscreen: matches.opt_present("f"),
            mute: matches.opt_present("a"),
        })
    }
}

/// Load every ROM a model's descriptor table names from `rom_dir`, wiring
/// each into the machine at its declared offset.
pub fn load_roms(machine: &mut zxs_core::Machine, settings: &Settings) -> io::Result<()> {
    for rom in settings.model.roms {
        let path = settings.rom_dir.join(rom.name);
        let data = fs::read(&path)?;
        if data.len() != rom.length {
            warn!("ROM `{}' is {} bytes; expected {}. Loading it anyway.", path.display(), data.len(), rom.length);
        }
        info!("Loaded ROM `{}' ({} bytes) at offset 0x{:X}.", path.display(), data.len(), rom.offset);
        machine.load_rom(rom.offset, &data);
    }
    Ok(())
}
