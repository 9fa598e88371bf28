/// Storage backend used when a configuration has no `storage` section
pub const DEFAULT_STORAGE_BACKEND: &str = "memory";
/// Samples at the start of a waveform used for the baseline estimate
pub const DEFAULT_PRE_SAMPLES: usize = 100;
/// Baseline noise above this (in ADC counts) means no baseline was found
pub const DEFAULT_MAX_BASELINE_SIGMA: f64 = 5.0;
/// Sample rate in samples per microsecond when a raw channel omits it
pub const DEFAULT_SAMPLE_RATE: f64 = 250.0;
/// Pulse threshold on the baseline-subtracted waveform (negative-going pulses)
pub const DEFAULT_PULSE_THRESHOLD: f64 = -5.0;
/// Afterpulse amplitude threshold on the baseline-subtracted waveform
pub const DEFAULT_AP_AMP_THRESHOLD: f64 = -3.0;
/// Single photoelectron integral used to convert integrals to npe
pub const DEFAULT_SPE_MEAN: f64 = 1.0;
