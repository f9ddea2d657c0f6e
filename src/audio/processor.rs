use crossbeam::channel::{Receiver, Sender, TrySendError, bounded};
use log::{debug, info, warn};
use std::sync::Arc;

use crate::audio::meter::{MeterInfo, SharedMeter};
use crate::tape::chain::TapeChain;
use crate::tape::params::Parameters;
use crate::tape::stages::clipper::ClipperMode;

pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 4096;

const MESSAGE_CAPACITY: usize = 32;

/// Requests that can't be expressed as a single parameter store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorMessage {
    /// Zero the anti-alias filter memory.
    ResetAntiAlias,
    /// Clear all running state (phases, filter memories, hold, meter).
    Reset,
}

/// The tape processor. Owned by the audio thread.
///
/// Parameter changes arrive through [`ProcessorHandle`]s (or the delegating
/// setters here) as relaxed atomic stores; the processor snapshots them once
/// per block. Processing never allocates once the block size has been
/// prepared, never locks and never fails.
pub struct Processor {
    sample_rate: f32,
    max_block_size: usize,
    chain: TapeChain,
    rx_updates: Receiver<ProcessorMessage>,
    handle: ProcessorHandle,
    clipping: bool,
}

/// Cheap, cloneable control surface for the processor.
///
/// Safe to use from any thread: setters clamp and store atomics, meter reads
/// load the values published after the latest block.
#[derive(Clone)]
pub struct ProcessorHandle {
    params: Arc<Parameters>,
    meter: Arc<SharedMeter>,
    tx_updates: Sender<ProcessorMessage>,
}

impl Processor {
    pub fn new(sample_rate: f32) -> (Self, ProcessorHandle) {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            warn!("Invalid sample rate {sample_rate}, falling back to {DEFAULT_SAMPLE_RATE}");
            DEFAULT_SAMPLE_RATE
        };

        let (tx_updates, rx_updates) = bounded(MESSAGE_CAPACITY);
        let handle = ProcessorHandle {
            params: Arc::new(Parameters::new()),
            meter: Arc::new(SharedMeter::new()),
            tx_updates,
        };

        let mut chain = TapeChain::new(sample_rate);
        chain.reserve(DEFAULT_MAX_BLOCK_SIZE);

        debug!("Tape processor created at {sample_rate} Hz");

        (
            Self {
                sample_rate,
                max_block_size: DEFAULT_MAX_BLOCK_SIZE,
                chain,
                rx_updates,
                handle: handle.clone(),
                clipping: false,
            },
            handle,
        )
    }

    /// Pre-allocate scratch for blocks of up to `max_block_size` samples.
    ///
    /// Call outside the audio callback. Larger blocks still work but allocate
    /// once when first seen.
    pub fn prepare(&mut self, max_block_size: usize) {
        if max_block_size > self.max_block_size {
            info!(
                "Growing processor scratch from {} to {} samples",
                self.max_block_size, max_block_size
            );
            self.max_block_size = max_block_size;
        }
        self.chain.reserve(max_block_size);
    }

    pub const fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub const fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    pub fn handle(&self) -> ProcessorHandle {
        self.handle.clone()
    }

    pub fn params(&self) -> &Parameters {
        &self.handle.params
    }

    // --- Parameter setters ---

    pub fn set_drive(&self, amount: f32) {
        self.handle.set_drive(amount);
    }

    pub fn set_tone(&self, amount: f32) {
        self.handle.set_tone(amount);
    }

    pub fn set_bit_depth(&self, bits: f32) {
        self.handle.set_bit_depth(bits);
    }

    pub fn set_resample_rate(&self, rate: f32) {
        self.handle.set_resample_rate(rate);
    }

    pub fn set_wow(&self, amount: f32) {
        self.handle.set_wow(amount);
    }

    pub fn set_flutter(&self, amount: f32) {
        self.handle.set_flutter(amount);
    }

    pub fn set_low_pass(&self, hz: f32) {
        self.handle.set_low_pass(hz);
    }

    pub fn set_noise(&self, amount: f32) {
        self.handle.set_noise(amount);
    }

    pub fn set_output_gain_db(&self, db: f32) {
        self.handle.set_output_gain_db(db);
    }

    pub fn set_clipper_mode(&self, mode: ClipperMode) {
        self.handle.set_clipper_mode(mode);
    }

    pub fn set_clipper_threshold(&self, threshold: f32) {
        self.handle.set_clipper_threshold(threshold);
    }

    pub fn set_clipper_enabled(&self, enabled: bool) {
        self.handle.set_clipper_enabled(enabled);
    }

    pub fn set_anti_alias_enabled(&mut self, enabled: bool) {
        self.handle.params.set_anti_alias_enabled(enabled);
        if !enabled {
            self.chain.reset_anti_alias();
        }
        debug!("Anti-alias enabled: {enabled}");
    }

    pub fn set_power(&self, on: bool) {
        self.handle.set_power(on);
    }

    // --- Processing ---

    /// Process `input` into `output`.
    ///
    /// Only the common prefix of the two slices is processed; any extra
    /// output samples are zeroed.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        let frames = input.len().min(output.len());
        output[..frames].copy_from_slice(&input[..frames]);
        output[frames..].fill(0.0);
        self.process_in_place(&mut output[..frames]);
    }

    /// Run the full tape chain over `buffer` in place.
    pub fn process_in_place(&mut self, buffer: &mut [f32]) {
        self.handle_messages();

        let params = self.handle.params.snapshot();
        if !params.power {
            self.clipping = false;
            self.handle.meter.publish(self.chain.vu_level(), false);
            return;
        }

        self.chain.apply(&params);
        self.chain.process_block(buffer);

        self.clipping = self.chain.is_clipping();
        self.handle
            .meter
            .publish(self.chain.vu_level(), self.clipping);
    }

    /// Process a block into a newly allocated buffer.
    ///
    /// Convenient for offline rendering; audio callbacks should use
    /// [`process`](Self::process) or [`process_in_place`](Self::process_in_place).
    pub fn process_buffer(&mut self, input: &[f32]) -> Vec<f32> {
        let mut output = input.to_vec();
        self.process_in_place(&mut output);
        output
    }

    fn handle_messages(&mut self) {
        while let Ok(message) = self.rx_updates.try_recv() {
            match message {
                ProcessorMessage::ResetAntiAlias => self.chain.reset_anti_alias(),
                ProcessorMessage::Reset => self.reset_state(),
            }
        }
    }

    fn reset_state(&mut self) {
        self.chain.reset();
        self.clipping = false;
        self.handle.meter.reset();
    }

    /// Clear all running state. Parameters are kept.
    pub fn reset(&mut self) {
        debug!("Resetting tape processor state");
        self.reset_state();
    }

    // --- Readback ---

    /// Decaying peak level measured after the drive stage.
    pub const fn vu_meter_level(&self) -> f32 {
        self.chain.vu_level()
    }

    /// Whether the clipper engaged during the most recent block.
    pub const fn is_clipping(&self) -> bool {
        self.clipping
    }

    pub fn meter(&self) -> MeterInfo {
        MeterInfo::from_level(self.vu_meter_level(), self.clipping)
    }

    pub const fn anti_alias_state(&self) -> f32 {
        self.chain.anti_alias_state()
    }

    /// Tear the processor down. Handles stay valid but no longer affect audio.
    pub fn shutdown(self) {
        info!("Shutting down tape processor");
        self.handle.meter.reset();
    }
}

impl ProcessorHandle {
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn set_drive(&self, amount: f32) {
        self.params.set_drive(amount);
    }

    pub fn set_tone(&self, amount: f32) {
        self.params.set_tone(amount);
    }

    pub fn set_bit_depth(&self, bits: f32) {
        self.params.set_bit_depth(bits);
    }

    pub fn set_resample_rate(&self, rate: f32) {
        self.params.set_resample_rate(rate);
    }

    pub fn set_wow(&self, amount: f32) {
        self.params.set_wow(amount);
    }

    pub fn set_flutter(&self, amount: f32) {
        self.params.set_flutter(amount);
    }

    pub fn set_low_pass(&self, hz: f32) {
        self.params.set_low_pass(hz);
    }

    pub fn set_noise(&self, amount: f32) {
        self.params.set_noise(amount);
    }

    pub fn set_output_gain_db(&self, db: f32) {
        self.params.set_output_gain_db(db);
    }

    pub fn set_clipper_mode(&self, mode: ClipperMode) {
        self.params.set_clipper_mode(mode);
    }

    pub fn set_clipper_threshold(&self, threshold: f32) {
        self.params.set_clipper_threshold(threshold);
    }

    pub fn set_clipper_enabled(&self, enabled: bool) {
        if self.params.clipper_enabled() != enabled {
            debug!("Clipper enabled: {enabled}");
        }
        self.params.set_clipper_enabled(enabled);
    }

    /// Disabling also zeroes the anti-alias memory before the next block.
    pub fn set_anti_alias_enabled(&self, enabled: bool) {
        self.params.set_anti_alias_enabled(enabled);
        if !enabled {
            self.send(ProcessorMessage::ResetAntiAlias);
        }
        debug!("Anti-alias enabled: {enabled}");
    }

    pub fn set_power(&self, on: bool) {
        if self.params.power() != on {
            info!("Tape power {}", if on { "on" } else { "off" });
        }
        self.params.set_power(on);
    }

    /// Ask the processor to clear its running state before the next block.
    pub fn reset(&self) {
        self.send(ProcessorMessage::Reset);
    }

    pub fn vu_meter_level(&self) -> f32 {
        self.meter.vu_level()
    }

    pub fn is_clipping(&self) -> bool {
        self.meter.is_clipping()
    }

    pub fn meter(&self) -> MeterInfo {
        self.meter.info()
    }

    fn send(&self, message: ProcessorMessage) {
        match self.tx_updates.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                warn!("Processor message queue full, dropping {message:?}");
            }
            Err(TrySendError::Disconnected(message)) => {
                debug!("Processor gone, ignoring {message:?}");
            }
        }
    }
}
