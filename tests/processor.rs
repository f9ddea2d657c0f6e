use anyhow::Result;
use lofi_tape::audio::processor::Processor;
use lofi_tape::tape::stages::clipper::ClipperMode;
use std::f32::consts::PI;

const SAMPLE_RATE: f32 = 44_100.0;

fn sine(freq: f32, amplitude: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| amplitude * (2.0 * PI * freq * i as f32 / SAMPLE_RATE).sin())
        .collect()
}

#[test]
fn neutral_settings_are_near_transparent() -> Result<()> {
    let (mut processor, _) = Processor::new(SAMPLE_RATE);
    let input = sine(100.0, 0.4, 512);

    let output = processor.process_buffer(&input);
    assert_eq!(output.len(), input.len());
    assert!(output.iter().all(|s| s.is_finite()));

    // The tone roll-off weights every sample after the first by 0.7 even at
    // zero tone; everything else is close to identity at these levels.
    assert!((output[0] - input[0]).abs() < 1e-3);
    for (i, (&out, &dry)) in output.iter().zip(&input).enumerate().skip(1) {
        assert!(
            (out - dry * 0.7).abs() < 1e-2,
            "sample {i}: got {out}, expected about {}",
            dry * 0.7
        );
    }

    assert!(!processor.is_clipping());
    Ok(())
}

#[test]
fn drive_meter_tracks_saturated_peak() -> Result<()> {
    let (mut processor, handle) = Processor::new(SAMPLE_RATE);
    handle.set_drive(1.0);

    processor.process_buffer(&[0.9]);

    // 0.9 * 10 crosses the 0.7 knee: 0.7 + 8.3 * 0.3 * tanh(3 * 8.3)
    let knee = 0.7 + 8.3 * 0.3 * (3.0f32 * 8.3).tanh();
    let expected = knee + (knee * PI).sin() * 0.05;
    assert!((processor.vu_meter_level() - expected).abs() < 1e-4);
    assert!((handle.vu_meter_level() - expected).abs() < 1e-4);

    // The raw level runs above full scale; the display readback does not
    let info = handle.meter();
    assert_eq!(info.vu_level, 1.0);
    assert_eq!(info.vu_db, 0.0);
    assert_eq!(processor.meter(), info);

    Ok(())
}

#[test]
fn meter_decays_between_buffers() -> Result<()> {
    let (mut processor, handle) = Processor::new(SAMPLE_RATE);
    handle.set_drive(1.0);

    processor.process_buffer(&[0.9]);
    let peak = processor.vu_meter_level();

    let mut expected = peak;
    for _ in 0..10 {
        processor.process_buffer(&[0.0]);
        expected *= 0.95;
        assert!((processor.vu_meter_level() - expected).abs() < 1e-5);
    }

    let info = handle.meter();
    assert!(info.vu_level < peak);
    assert!(info.vu_db < 20.0 * peak.log10());
    Ok(())
}

#[test]
fn clipping_flag_follows_engaged_clipper() -> Result<()> {
    let (mut processor, handle) = Processor::new(SAMPLE_RATE);
    let loud = vec![0.6; 64];

    // Not engaged: never reports
    processor.process_buffer(&loud);
    assert!(!processor.is_clipping());

    handle.set_clipper_enabled(true);
    handle.set_clipper_mode(ClipperMode::Hard);
    handle.set_clipper_threshold(0.2);

    let output = processor.process_buffer(&loud);
    assert!(processor.is_clipping());
    assert!(handle.is_clipping());
    assert!(output.iter().all(|s| s.abs() <= 0.2 * 1.1 + 1e-6));

    // The flag reflects only the latest buffer
    processor.process_buffer(&[0.0; 64]);
    assert!(!processor.is_clipping());

    Ok(())
}

#[test]
fn power_off_bypasses_everything() -> Result<()> {
    let (mut processor, handle) = Processor::new(SAMPLE_RATE);
    handle.set_drive(1.0);
    handle.set_clipper_enabled(true);
    handle.set_clipper_threshold(0.1);

    processor.process_buffer(&[0.9; 16]);
    let held = processor.vu_meter_level();
    assert!(processor.is_clipping());

    handle.set_power(false);
    let input = sine(440.0, 0.9, 256);
    let output = processor.process_buffer(&input);

    assert_eq!(output, input);
    assert!(!processor.is_clipping());
    assert_eq!(processor.vu_meter_level(), held);

    handle.set_power(true);
    let output = processor.process_buffer(&input);
    assert_ne!(output, input);

    Ok(())
}

#[test]
fn handle_works_from_another_thread() -> Result<()> {
    let (mut processor, handle) = Processor::new(SAMPLE_RATE);

    let ui = handle.clone();
    std::thread::spawn(move || {
        ui.set_drive(0.5);
        ui.set_low_pass(1_000.0);
        ui.set_output_gain_db(-6.0);
    })
    .join()
    .map_err(|_| anyhow::anyhow!("control thread panicked"))?;

    assert_eq!(processor.params().drive(), 0.5);
    assert_eq!(processor.params().low_pass_hz(), 1_000.0);

    processor.process_buffer(&sine(100.0, 0.3, 128));
    assert!(handle.vu_meter_level() > 0.0);

    Ok(())
}

#[test]
fn low_pass_memory_carries_across_buffers() -> Result<()> {
    let (mut processor, handle) = Processor::new(SAMPLE_RATE);
    handle.set_low_pass(200.0);

    processor.process_buffer(&[0.3; 64]);
    let output = processor.process_buffer(&[0.0; 4]);

    assert!(output[0] > 0.0, "filter memory was lost between buffers");
    assert!(output[1] < output[0]);

    Ok(())
}

#[test]
fn resampler_hold_carries_across_buffers() -> Result<()> {
    let (mut processor, handle) = Processor::new(SAMPLE_RATE);
    handle.set_resample_rate(0.25);

    let ramp: Vec<f32> = (0..6).map(|i| 0.01 * (i + 1) as f32).collect();
    let first = processor.process_buffer(&ramp);
    let second = processor.process_buffer(&[0.0; 2]);

    // Sample 4 latched 0.05; the next latch is due at sample 8
    assert!((second[0] - first[5]).abs() < 1e-3);
    assert!(second[0] > 0.0);

    Ok(())
}

#[test]
fn output_gain_scales_output() -> Result<()> {
    let input = sine(100.0, 0.3, 256);

    let (mut unity, _) = Processor::new(SAMPLE_RATE);
    let reference = unity.process_buffer(&input);

    let (mut quiet, handle) = Processor::new(SAMPLE_RATE);
    handle.set_output_gain_db(-6.0);
    let output = quiet.process_buffer(&input);

    let ratio = 10f32.powf(-6.0 / 20.0);
    for (&out, &expected) in output.iter().zip(&reference) {
        assert!((out - expected * ratio).abs() < 1e-5);
    }

    Ok(())
}

#[test]
fn anti_alias_disable_clears_state() -> Result<()> {
    let (mut processor, handle) = Processor::new(SAMPLE_RATE);
    handle.set_anti_alias_enabled(true);

    processor.process_buffer(&[0.3; 32]);
    assert!(processor.anti_alias_state() > 0.0);

    processor.set_anti_alias_enabled(false);
    assert_eq!(processor.anti_alias_state(), 0.0);

    // While disabled the filter tracks the last output sample
    let output = processor.process_buffer(&[0.2; 8]);
    assert_eq!(processor.anti_alias_state(), output[7]);

    Ok(())
}

#[test]
fn anti_alias_disable_from_handle_resets_before_next_buffer() -> Result<()> {
    let (mut processor, handle) = Processor::new(SAMPLE_RATE);
    handle.set_anti_alias_enabled(true);
    processor.process_buffer(&[0.3; 32]);

    handle.set_anti_alias_enabled(false);
    assert!(processor.anti_alias_state() > 0.0);

    // An empty buffer still drains pending requests
    processor.process_buffer(&[]);
    assert_eq!(processor.anti_alias_state(), 0.0);

    Ok(())
}

#[test]
fn reset_clears_running_state() -> Result<()> {
    let (mut processor, handle) = Processor::new(SAMPLE_RATE);
    handle.set_drive(0.8);
    handle.set_wow(1.0);
    handle.set_anti_alias_enabled(true);

    processor.process_buffer(&sine(220.0, 0.5, 512));
    assert!(processor.vu_meter_level() > 0.0);

    processor.reset();
    assert_eq!(processor.vu_meter_level(), 0.0);
    assert_eq!(processor.anti_alias_state(), 0.0);
    assert_eq!(handle.meter().vu_level, 0.0);
    assert_eq!(processor.params().drive(), 0.8);

    Ok(())
}

#[test]
fn tape_hiss_is_deterministic_and_quiet() -> Result<()> {
    let silence = vec![0.0f32; 512];

    let (mut first, handle) = Processor::new(SAMPLE_RATE);
    assert_eq!(first.process_buffer(&silence), silence);

    handle.set_noise(1.0);
    let hiss = first.process_buffer(&silence);
    assert!(hiss.iter().any(|&s| s != 0.0));
    // -45 dB at full amount, triangular so never above the gain
    let ceiling = 10f32.powf(-45.0 / 20.0);
    assert!(hiss.iter().all(|s| s.abs() <= ceiling));

    let (mut second, other) = Processor::new(SAMPLE_RATE);
    other.set_noise(1.0);
    assert_eq!(second.process_buffer(&silence), hiss);

    // Reset rewinds the generator
    first.reset();
    assert_eq!(first.process_buffer(&silence), hiss);

    Ok(())
}

#[test]
fn extreme_settings_stay_finite() -> Result<()> {
    let (mut processor, handle) = Processor::new(SAMPLE_RATE);
    handle.set_drive(1.0);
    handle.set_tone(1.0);
    handle.set_bit_depth(4.0);
    handle.set_resample_rate(0.1);
    handle.set_wow(1.0);
    handle.set_flutter(1.0);
    handle.set_low_pass(200.0);
    handle.set_noise(1.0);
    handle.set_output_gain_db(12.0);
    handle.set_clipper_enabled(true);
    handle.set_anti_alias_enabled(true);

    for _ in 0..20 {
        let output = processor.process_buffer(&sine(3_000.0, 1.0, 256));
        assert!(output.iter().all(|s| s.is_finite()));
    }

    processor.shutdown();
    Ok(())
}
