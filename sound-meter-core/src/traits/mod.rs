pub mod audio_source;
pub mod meter_delegate;
