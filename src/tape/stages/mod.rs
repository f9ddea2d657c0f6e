pub mod bitcrusher;
pub mod clipper;
pub mod common;
pub mod drive;
pub mod filter;
pub mod level;
pub mod modulation;
pub mod noise;
pub mod resampler;
pub mod tone;

// The core trait that all tape stages implement
pub trait Stage: Send + 'static {
    // Process a single sample, equivalent to a one-sample block
    fn process(&mut self, input: f32) -> f32;

    // Process a block of samples in place
    fn process_block(&mut self, input: &mut [f32]) {
        for sample in input.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    // Clear running state; parameters are untouched
    fn reset(&mut self) {}
}
