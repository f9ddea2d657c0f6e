use crate::tape::params::ParamSnapshot;
use crate::tape::stages::Stage;
use crate::tape::stages::bitcrusher::BitcrusherStage;
use crate::tape::stages::clipper::ClipperStage;
use crate::tape::stages::drive::DriveStage;
use crate::tape::stages::filter::{AntiAliasFilter, LowPassStage};
use crate::tape::stages::level::LevelStage;
use crate::tape::stages::modulation::ModulationStage;
use crate::tape::stages::noise::NoiseStage;
use crate::tape::stages::resampler::ResamplerStage;
use crate::tape::stages::tone::ToneStage;

// TapeChain runs the fixed tape signal path:
// drive -> tone -> bitcrusher -> resampler -> wow -> flutter -> low-pass
// -> (hiss) -> output level -> clipper -> (anti-alias)
pub struct TapeChain {
    drive: DriveStage,
    tone: ToneStage,
    bitcrusher: BitcrusherStage,
    resampler: ResamplerStage,
    wow: ModulationStage,
    flutter: ModulationStage,
    low_pass: LowPassStage,
    noise: NoiseStage,
    level: LevelStage,
    clipper: ClipperStage,
    anti_alias: AntiAliasFilter,
    anti_alias_enabled: bool,
}

impl TapeChain {
    pub fn new(sample_rate: f32) -> Self {
        let defaults = ParamSnapshot::default();

        let mut chain = Self {
            drive: DriveStage::new(defaults.drive),
            tone: ToneStage::new(defaults.tone),
            bitcrusher: BitcrusherStage::new(defaults.bit_depth),
            resampler: ResamplerStage::new(defaults.resample_rate),
            wow: ModulationStage::wow(sample_rate),
            flutter: ModulationStage::flutter(sample_rate),
            low_pass: LowPassStage::new(defaults.low_pass_hz, sample_rate),
            noise: NoiseStage::new(defaults.noise),
            level: LevelStage::new(defaults.output_gain),
            clipper: ClipperStage::new(
                defaults.clipper_mode,
                defaults.clipper_threshold,
                defaults.clipper_enabled,
            ),
            anti_alias: AntiAliasFilter::new(sample_rate),
            anti_alias_enabled: defaults.anti_alias_enabled,
        };
        chain.apply(&defaults);
        chain
    }

    /// Push a parameter snapshot into every stage.
    pub fn apply(&mut self, params: &ParamSnapshot) {
        self.drive.set_amount(params.drive);
        self.tone.set_amount(params.tone);
        self.bitcrusher.set_bit_depth(params.bit_depth);
        self.resampler.set_rate(params.resample_rate);
        self.wow.set_amount(params.wow);
        self.flutter.set_amount(params.flutter);
        self.low_pass.set_cutoff(params.low_pass_hz);
        self.noise.set_amount(params.noise);
        self.level.set_gain(params.output_gain);
        self.clipper.set_mode(params.clipper_mode);
        self.clipper.set_threshold(params.clipper_threshold);
        self.clipper.set_enabled(params.clipper_enabled);
        self.anti_alias_enabled = params.anti_alias_enabled;
    }

    /// Grow internal scratch so blocks up to `max_block_size` don't allocate.
    pub fn reserve(&mut self, max_block_size: usize) {
        self.wow.reserve(max_block_size);
        self.flutter.reserve(max_block_size);
    }

    // process_block runs one block through every stage in order.
    pub fn process_block(&mut self, buffer: &mut [f32]) {
        self.clipper.clear_clipped();

        self.drive.process_block(buffer);
        self.tone.process_block(buffer);
        self.bitcrusher.process_block(buffer);
        self.resampler.process_block(buffer);
        self.wow.process_block(buffer);
        self.flutter.process_block(buffer);
        self.low_pass.process_block(buffer);
        self.noise.process_block(buffer);
        self.level.process_block(buffer);
        self.clipper.process_block(buffer);

        if self.anti_alias_enabled {
            self.anti_alias.process_block(buffer);
        } else {
            self.anti_alias.track(buffer);
        }
    }

    pub fn reset_anti_alias(&mut self) {
        self.anti_alias.reset();
    }

    /// Clear all running state. Parameters are kept.
    pub fn reset(&mut self) {
        self.drive.reset();
        self.tone.reset();
        self.bitcrusher.reset();
        self.resampler.reset();
        self.wow.reset();
        self.flutter.reset();
        self.low_pass.reset();
        self.noise.reset();
        self.level.reset();
        self.clipper.reset();
        self.anti_alias.reset();
    }

    pub const fn vu_level(&self) -> f32 {
        self.drive.meter_level()
    }

    pub const fn is_clipping(&self) -> bool {
        self.clipper.clipped()
    }

    pub const fn anti_alias_state(&self) -> f32 {
        self.anti_alias.state()
    }

    pub const fn wow_phase(&self) -> f32 {
        self.wow.phase()
    }

    pub const fn flutter_phase(&self) -> f32 {
        self.flutter.phase()
    }
}
