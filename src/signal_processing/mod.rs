pub mod delay_line;
pub mod filter;
pub mod fir;
pub mod iir_biquad;
pub mod lms;
pub mod moving_average;
pub mod response;

pub use delay_line::DelayLine;
pub use filter::{AdaptiveOutput, AdaptiveStreamingFilter, StreamingFilter};
pub use fir::FirFilter;
pub use iir_biquad::BiquadCascade;
pub use lms::LmsFilter;
pub use moving_average::MovingAverage;
pub use response::{FrequencyResponse, biquad_cascade_response, engine_response, fir_response};
