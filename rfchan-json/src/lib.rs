//! rfchan-json contains the JSON schemas used by the rfchan daemon API and by
//! the persisted configuration record.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// API JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api`. It contains the
/// settings of the full readout pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Api {
    /// Pipeline geometry.
    pub geometry: Geometry,
    /// Filter bank settings.
    pub pfb: Pfb,
    /// Channel routing table.
    pub routes: Routes,
    /// Per-lane local oscillator settings.
    pub lanes: Vec<Lane>,
    /// Accumulator settings.
    pub accumulator: AccumulatorSettings,
    /// Input selection.
    pub input: Input,
    /// Post-PFB test vector generator.
    pub tvg: Tvg,
    /// Sync controller state.
    pub sync: SyncStatus,
    /// Overflow and sync diagnostics.
    pub diagnostics: Diagnostics,
}

/// Geometry JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/geometry`. The
/// geometry is fixed when the pipeline is created, so all its fields are
/// read-only.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct Geometry {
    /// Number of channels of the analysis filter bank (FFT size).
    pub channels: u32,
    /// Number of processing lanes.
    pub lanes: u32,
    /// Number of wideband samples per step.
    pub parallelism: u32,
    /// Number of taps per polyphase branch.
    pub taps: u32,
    /// Filter bank hop in wideband samples.
    pub hop: u32,
    /// Steps from a sync to the first valid channel spectrum.
    pub analysis_latency: u64,
    /// Steps from a sync to the first valid output frame.
    pub output_latency: u64,
}

/// Filter bank JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/pfb`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Pfb {
    /// Analysis FFT shift mask (bit `i` shifts stage `i`).
    pub analysis_shift: u32,
    /// Synthesis inverse FFT shift mask (bit `i` shifts stage `i`).
    pub synthesis_shift: u32,
    /// Output scale applied after the synthesis filter bank.
    pub output_scale: f64,
    /// Signal fed to the synthesis filter bank.
    pub output_mode: OutputMode,
    /// Gain of the analysis filter bank for a channel-centred tone (read-only).
    pub analysis_gain: f64,
    /// Gain of the synthesis filter bank and output scale (read-only).
    pub synthesis_gain: f64,
}

/// Filter bank PATCH JSON schema.
///
/// This JSON schema corresponds to PATCH requests on `/api/pfb`. New values
/// are applied at the next spectrum boundary of the corresponding stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PatchPfb {
    /// Analysis FFT shift mask.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_shift: Option<u32>,
    /// Synthesis inverse FFT shift mask.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesis_shift: Option<u32>,
    /// Output scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_scale: Option<f64>,
    /// Output mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_mode: Option<OutputMode>,
}

/// Signal fed to the synthesis filter bank.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OutputMode {
    /// The mixed lanes are routed back into their channels.
    Loopback,
    /// The scaled local oscillator of each lane is placed in its channel.
    Tones,
}

macro_rules! impl_str_conv {
    ($ty:ty, $($s:expr => $v:ident),*) => {
        impl std::str::FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, ()> {
                Ok(match s {
                    $(
                        $s => <$ty>::$v,
                    )*
                        _ => return Err(()),
                })
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
                write!(f, "{}", match self {
                    $(
                        <$ty>::$v => $s,
                    )*
                })
            }
        }
    }
}

impl_str_conv!(OutputMode,
               "Loopback" => Loopback,
               "Tones" => Tones);

/// Input JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/input`.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct Input {
    /// The output stream is fed back into the analysis filter bank instead of
    /// the wideband input.
    pub loopback: bool,
}

/// Input PATCH JSON schema.
///
/// This JSON schema corresponds to PATCH requests on `/api/input`. Changes
/// apply from the next step.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct PatchInput {
    /// Internal loopback of the output stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loopback: Option<bool>,
}

/// Test vector generator JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/tvg`. When enabled,
/// the generator replaces each channel spectrum by a fixed test vector. The
/// spectrum timing and the sync epoch are unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct Tvg {
    /// The test vector replaces the analysis filter bank output.
    pub enabled: bool,
    /// Pattern loaded in the generator.
    pub pattern: TvgPattern,
}

/// Test vector generator PATCH JSON schema.
///
/// This JSON schema corresponds to PATCH requests on `/api/tvg`. New values
/// are applied at the next spectrum.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct PatchTvg {
    /// Enables or disables the generator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Pattern to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<TvgPattern>,
}

/// Test vector pattern.
///
/// Values are raw channel samples given as `[re, im]` integers.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub enum TvgPattern {
    /// Channel `k` takes the real value `k`, wrapped to 16 bits.
    FrequencyRamp,
    /// All the channels take the same value.
    Constant([i32; 2]),
    /// One value per channel.
    Custom(Vec<[i32; 2]>),
}

/// Snapshot JSON schema.
///
/// This JSON schema corresponds to GET requests on
/// `/api/snapshot/:source`. It contains the last capture of a wideband
/// stream.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct Snapshot {
    /// Captured stream.
    pub source: SnapshotSource,
    /// Capture state.
    pub state: SnapshotState,
    /// Pipeline step of the first captured sample.
    pub step: Option<u64>,
    /// Number of samples requested.
    pub length: u32,
    /// Captured samples as raw `[re, im]` integers.
    pub samples: Vec<[i32; 2]>,
}

/// Snapshot PATCH JSON schema.
///
/// This JSON schema corresponds to PATCH requests on `/api/snapshot/:source`.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct PatchSnapshot {
    /// Command to run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<SnapshotCommand>,
    /// Number of samples to capture. Defaults to the capture buffer size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

/// Snapshot command.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SnapshotCommand {
    /// Start a new capture at the next step.
    Trigger,
}

/// Wideband stream captured by a snapshot.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SnapshotSource {
    /// Input of the analysis filter bank.
    Adc,
    /// Output of the synthesis filter bank.
    Dac,
}

impl_str_conv!(SnapshotSource,
               "adc" => Adc,
               "dac" => Dac);

/// Snapshot capture state.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SnapshotState {
    /// No capture has been triggered.
    Idle,
    /// A capture is in progress.
    Capturing,
    /// The capture is complete.
    Complete,
}

/// Routes JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/routes`. Entry `i`
/// gives the channel routed to lane `i`, or `null` if the lane is zeroed.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct Routes {
    /// Route table currently in use.
    pub committed: Vec<Option<u32>>,
    /// Route table that will be committed at the next sync.
    pub pending: Vec<Option<u32>>,
}

/// Routes PUT JSON schema.
///
/// This JSON schema corresponds to PUT requests on `/api/routes`. It replaces
/// the whole route table. The table is applied at the next sync.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct PutRoutes {
    /// Route table, indexed by lane.
    pub routes: Vec<Option<u32>>,
}

/// Routes PATCH JSON schema.
///
/// This JSON schema corresponds to PATCH requests on `/api/routes`. It changes
/// the route of a single lane. The change is applied at the next sync.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct PatchRoute {
    /// Lane to modify.
    pub lane: u32,
    /// Channel routed to the lane, or `null` to zero the lane.
    pub channel: Option<u32>,
}

/// Lane JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/lanes/:lane`. It
/// contains the committed local oscillator settings of a lane.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Lane {
    /// Lane index.
    pub lane: u32,
    /// Channel routed to this lane.
    pub channel: Option<u32>,
    /// Phase step per spectrum in radians.
    pub delta_theta: f64,
    /// Phase offset in radians.
    pub theta0: f64,
    /// Output scale.
    pub scale: f64,
    /// Power mode: the lane outputs the squared magnitude of its input.
    pub power: bool,
    /// The phase accumulator will be reset at the next sync.
    pub reset_armed: bool,
}

/// Lane PATCH JSON schema.
///
/// This JSON schema corresponds to PATCH requests on `/api/lanes/:lane`. New
/// values are applied at the next spectrum boundary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PatchLane {
    /// Phase step per spectrum in radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_theta: Option<f64>,
    /// Phase offset in radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta0: Option<f64>,
    /// Output scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Power mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
    /// Arms (or disarms) the phase accumulator reset for the next sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<bool>,
}

/// Lane settings stored in the configuration record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LaneSettings {
    /// Phase step per spectrum in radians.
    pub delta_theta: f64,
    /// Phase offset in radians.
    pub theta0: f64,
    /// Output scale.
    pub scale: f64,
    /// Power mode.
    pub power: bool,
}

macro_rules! get_fields {
    ($struct:ident, $x:expr, $($field:ident),*) => {
        $struct {
            $(
                $field: Some($x.$field),
            )*
            ..Default::default()
        }
    }
}

impl From<LaneSettings> for PatchLane {
    fn from(val: LaneSettings) -> PatchLane {
        get_fields!(PatchLane, val, delta_theta, theta0, scale, power)
    }
}

/// Accumulator JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/accumulator`. It
/// contains the committed accumulator settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccumulatorSettings {
    /// Window length in spectra.
    pub length: u32,
    /// Window function applied to the samples of each window.
    pub window: WindowFunction,
    /// Accumulation mode.
    pub mode: AccumulatorMode,
    /// Accumulate the power of each lane in addition to the complex sum.
    pub power: bool,
    /// Readout of the latched accumulation through `/api/accumulator/latest`
    /// and `/api/accumulator/next`.
    #[serde(default)]
    pub readout: AccumulatorReadout,
}

/// Accumulator PATCH JSON schema.
///
/// This JSON schema corresponds to PATCH requests on `/api/accumulator`. New
/// values are applied at the next sync.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PatchAccumulator {
    /// Window length in spectra.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Window function.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowFunction>,
    /// Accumulation mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<AccumulatorMode>,
    /// Power accumulation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
    /// Readout of the latched accumulation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readout: Option<AccumulatorReadout>,
}

impl From<AccumulatorSettings> for PatchAccumulator {
    fn from(val: AccumulatorSettings) -> PatchAccumulator {
        get_fields!(PatchAccumulator, val, length, window, mode, power, readout)
    }
}

/// Accumulator window function.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum WindowFunction {
    /// No weighting.
    Rectangular,
    /// Hann window.
    Hann,
    /// Hamming window.
    Hamming,
    /// User supplied coefficients.
    ///
    /// The number of coefficients must match the number of window points
    /// required by the window length.
    Custom(Vec<f64>),
}

/// Accumulation mode.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AccumulatorMode {
    /// The accumulator is cleared after each window is latched.
    ResetEachWindow,
    /// The accumulator keeps integrating across windows.
    Running,
}

impl_str_conv!(AccumulatorMode,
               "Reset each window" => ResetEachWindow,
               "Running" => Running);

/// Readout of latched accumulations.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum AccumulatorReadout {
    /// Reads leave the latched accumulation in place.
    #[default]
    Snapshot,
    /// Reads take the latched accumulation, so each window is returned once.
    Drain,
}

impl_str_conv!(AccumulatorReadout,
               "Snapshot" => Snapshot,
               "Drain" => Drain);

/// Accumulation JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/accumulator/latest`,
/// `/api/accumulator/next` and `/api/accumulator/history/:index`. Values are
/// given in units of channel full scale.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Accumulation {
    /// Window index since the last sync.
    pub index: u64,
    /// Index of the first spectrum of the window, counted since the last sync.
    pub window_start: u64,
    /// Pipeline step at which the window was latched.
    pub step: u64,
    /// Window length in spectra.
    pub length: u32,
    /// Complex sum of each lane as `[re, im]`.
    pub data: Vec<[f64; 2]>,
    /// Power sum of each lane, if power accumulation is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<Vec<f64>>,
    /// Some partial sum saturated during this window.
    pub overflow: bool,
}

/// Sync JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/sync`.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct SyncStatus {
    /// Number of steps run since the pipeline was created.
    pub step: u64,
    /// Number of sync pulses issued.
    pub sync_count: u64,
    /// Step of the last sync pulse.
    pub last_sync: Option<u64>,
    /// A sync pulse is armed for the next step.
    pub armed: bool,
    /// Epoch of each stage.
    pub stages: Vec<StageEpoch>,
}

/// Epoch of a pipeline stage.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct StageEpoch {
    /// Pipeline stage.
    pub stage: Stage,
    /// Latency of the stage with respect to the sync pulse, in steps.
    pub latency: u64,
    /// Step at which the stage produces its first valid output.
    pub epoch_zero: Option<u64>,
}

/// Sync PATCH JSON schema.
///
/// This JSON schema corresponds to PATCH requests on `/api/sync`.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct PatchSync {
    /// Command to run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<SyncCommand>,
}

/// Sync command.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SyncCommand {
    /// Issue a sync pulse at the next step.
    Issue,
}

/// Pipeline stage.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Stage {
    /// Analysis filter bank.
    Analysis,
    /// Per-lane mixer.
    Mixer,
    /// Windowed accumulator.
    Accumulator,
    /// Synthesis filter bank and output scale.
    Synthesis,
}

impl Stage {
    /// All the pipeline stages, in dataflow order.
    pub const ALL: [Stage; 4] = [
        Stage::Analysis,
        Stage::Mixer,
        Stage::Accumulator,
        Stage::Synthesis,
    ];
}

impl_str_conv!(Stage,
               "Analysis" => Analysis,
               "Mixer" => Mixer,
               "Accumulator" => Accumulator,
               "Synthesis" => Synthesis);

/// Diagnostics JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/diagnostics`.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct Diagnostics {
    /// Overflow flag of each stage.
    pub overflow: Vec<StageOverflow>,
    /// Most recent overflow events.
    pub history: Vec<OverflowEvent>,
    /// Number of spectra discarded because they were produced before a sync.
    pub sync_missing: u64,
}

/// Overflow state of a stage.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct StageOverflow {
    /// Pipeline stage.
    pub stage: Stage,
    /// Sticky overflow flag.
    pub flag: bool,
    /// Number of times the flag has been raised from the cleared state.
    pub rising_edges: u64,
    /// Number of frames that saturated.
    pub events: u64,
}

/// Overflow event.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct OverflowEvent {
    /// Pipeline step at which the overflow happened.
    pub step: u64,
    /// Stage that saturated.
    pub stage: Stage,
}

/// Diagnostics PATCH JSON schema.
///
/// This JSON schema corresponds to PATCH requests on `/api/diagnostics`.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct PatchDiagnostics {
    /// Clears the sticky overflow flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_overflow: Option<bool>,
    /// Resets the overflow counters and history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_counters: Option<bool>,
}

/// Status JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/status`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Status {
    /// Status of each block.
    pub blocks: Vec<BlockStatus>,
    /// Mean power of the output stream in dB relative to full scale.
    pub output_power_dbfs: Option<f64>,
}

/// Status of a block of the pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct BlockStatus {
    /// Block name.
    pub block: String,
    /// The block has no warnings.
    pub ok: bool,
    /// Warnings.
    pub warnings: Vec<String>,
}

/// Configuration record JSON schema.
///
/// This JSON schema corresponds to GET and PUT requests on `/api/config` and
/// to the file where the configuration is persisted. A record is applied as a
/// single unit: if any of its values is invalid nothing is applied.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConfigRecord {
    /// Route table, indexed by lane.
    pub routes: Vec<Option<u32>>,
    /// Local oscillator settings, indexed by lane.
    pub lanes: Vec<LaneSettings>,
    /// Accumulator settings.
    pub accumulator: AccumulatorSettings,
    /// Analysis FFT shift mask.
    pub analysis_shift: u32,
    /// Synthesis inverse FFT shift mask.
    pub synthesis_shift: u32,
    /// Output scale.
    pub output_scale: f64,
    /// Output mode.
    pub output_mode: OutputMode,
}

/// Versions JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api/versions`.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct Versions {
    /// Git version of the rfchan daemon.
    pub rfchan_git: String,
    /// Crate version of the rfchan daemon.
    pub rfchan_version: String,
}

/// Error JSON schema.
///
/// This JSON schema is used by the server to return error messages. The
/// `suggested_action` tells clients how the error should be presented.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash)]
pub struct Error {
    /// HTTP status code.
    pub http_status_code: u16,
    /// Description of the error.
    pub error_description: String,
    /// Suggested action for the client.
    pub suggested_action: ErrorAction,
}

/// Suggested action for an [`Error`].
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorAction {
    /// Ignore the error.
    Ignore,
    /// Log the error.
    Log,
    /// Show the error to the user.
    Alert,
}
