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

mod config;
mod sdl_keyboard;
mod timing;

use std::process::exit;

use log::error;
use sdl2::event::Event;
use sdl2::pixels::PixelFormatEnum;
use sdl2::audio::{AudioQueue, AudioSpecDesired};

use sdl_keyboard::{Action, SdlKeyboard};
use zxs_core::Machine;

fn print_usage(program: &str, options: &getopts::Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", options.usage(&brief));
}

fn get_progname(args: &[String]) -> String {
    std::path::Path::new(&args[0]).file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| args[0].clone())
}

fn run() -> i32 {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let progname = get_progname(&args);
    let options = config::build_options();

    let matches = match options.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(fail) => {
            println!("{}", fail);
            print_usage(&progname, &options);
            return 1;
        },
    };
    if matches.opt_present("h") {
        print_usage(&progname, &options);
        return 0;
    }
    let settings = match config::Settings::from_matches(&matches) {
        Some(settings) => settings,
        None => return 1,
    };

    let mut machine = Machine::new(settings.model.kind);
    if let Err(err) = config::load_roms(&mut machine, &settings) {
        error!("Failed to load ROM image(s) from `{}': {}", settings.rom_dir.display(), err);
        return 1;
    }
    machine.power(true);

    let sdl_context = match sdl2::init() {
        Ok(ctx) => ctx,
        Err(err) => { error!("Failed to initialize SDL2: {}", err); return 1; },
    };
    let video_subsystem = match sdl_context.video() {
        Ok(vs) => vs,
        Err(err) => { error!("Failed to initialize the SDL2 video subsystem: {}", err); return 1; },
    };
    let audio_subsystem = match sdl_context.audio() {
        Ok(aus) => aus,
        Err(err) => { error!("Failed to initialize the SDL2 audio subsystem: {}", err); return 1; },
    };

    let fb_width = machine.framebuffer().width;
    let fb_height = machine.framebuffer().height;

    let mut window_builder = video_subsystem.window("zxs", fb_width * settings.scale, fb_height * settings.scale);
    window_builder.position_centered().resizable();
    if settings.fullscreen {
        window_builder.fullscreen_desktop();
    }
    let window = match window_builder.build() {
        Ok(window) => window,
        Err(err) => { error!("Failed to create the SDL2 window: {}", err); return 1; },
    };
    let mut canvas = match window.into_canvas().present_vsync().build() {
        Ok(canvas) => canvas,
        Err(err) => { error!("Failed to create the SDL2 canvas: {}", err); return 1; },
    };
    let texture_creator = canvas.texture_creator();
    let mut texture = match texture_creator.create_texture_streaming(PixelFormatEnum::ABGR8888, fb_width, fb_height) {
        Ok(texture) => texture,
        Err(err) => { error!("Failed to create the framebuffer texture: {}", err); return 1; },
    };

    let audio_spec = AudioSpecDesired { freq: Some(44100), channels: Some(1), samples: None };
    let audio_queue: AudioQueue<i16> = match audio_subsystem.open_queue(None, &audio_spec) {
        Ok(queue) => queue,
        Err(err) => { error!("Failed to open the SDL2 audio device: {}", err); return 1; },
    };
    audio_queue.resume();

    let mut event_pump = match sdl_context.event_pump() {
        Ok(pump) => pump,
        Err(err) => { error!("Failed to create the SDL2 event pump: {}", err); return 1; },
    };

    let mut keyboard = SdlKeyboard::new();
    let mut paused = false;
    let mut frame_timer = timing::FrameTimer::new(settings.model.timing.cycles_per_frame, settings.model.timing.cycles_per_scanline);

    'running: loop {
        for event in event_pump.poll_iter() {
            match keyboard.handle_event(&event) {
                Action::Quit => break 'running,
                Action::TogglePause => paused = !paused,
                Action::ResetHard => machine.reset(),
                Action::ToggleFullscreen => {
                    let fullscreen = canvas.window().fullscreen_state() == sdl2::video::FullscreenType::Off;
                    let kind = if fullscreen { sdl2::video::FullscreenType::Desktop } else { sdl2::video::FullscreenType::Off };
                    let _ = canvas.window_mut().set_fullscreen(kind);
                },
                Action::None => {
                    if let Event::Quit { .. } = event { break 'running; }
                },
            }
        }

        if !paused {
            machine.set_keyboard_bitmap(keyboard.bitmap());
            machine.run_1_frame();

            let pixels = machine.framebuffer().pixels();
            let pitch = (fb_width * 4) as usize;
            if let Err(err) = texture.with_lock(None, |buffer: &mut [u8], _pitch: usize| {
                for (i, pixel) in pixels.iter().enumerate() {
                    let bytes = pixel.to_le_bytes();
                    let off = i * 4;
                    buffer[off..off + 4].copy_from_slice(&bytes);
                }
            }) {
                error!("Failed to update the framebuffer texture: {}", err);
            }
            let _ = pitch;

            canvas.clear();
            let _ = canvas.copy(&texture, None, None);
            canvas.present();

            if !settings.mute {
                let _ = audio_queue.queue_audio(machine.audio_samples());
            }
        }

        frame_timer.sleep_for_remainder();
    }

    0
}

fn main() {
    exit(run());
}
