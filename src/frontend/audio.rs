use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};
use sdl2::AudioSubsystem;

const TONE_HZ: f32 = 440.0;

static DESIRED_AUDIO_SPEC: AudioSpecDesired = AudioSpecDesired {
    freq: Some(44100),
    channels: Some(1),
    samples: Some(2048),
};

/// Square wave generator.
struct Tone {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for Tone {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for x in out.iter_mut() {
            *x = if self.phase < 0.5 { self.volume } else { -self.volume };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

/// Plays the tone while the machine's sound timer runs.
pub struct Beeper {
    device: AudioDevice<Tone>,
    active: bool,
}

impl Beeper {
    pub fn new(audio: &AudioSubsystem) -> Result<Self, String> {
        let device = audio.open_playback(None, &DESIRED_AUDIO_SPEC, |spec| Tone {
            phase_inc: TONE_HZ / spec.freq as f32,
            phase: 0.0,
            volume: 0.25,
        })?;

        Ok(Self {
            device,
            active: false,
        })
    }

    pub fn set_active(&mut self, active: bool) {
        if active == self.active {
            return;
        }
        if active {
            self.device.resume();
        } else {
            self.device.pause();
        }
        self.active = active;
    }
}
