//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                  |
//! |------------|--------------|------------------------------|
//! | `feedback` | FeedbackSink | Log-rendered LED / buzzer    |
//! | `log_sink` | EventSink    | Status channel (log facade)  |
//! | `sim`      | SensorPort   | Scripted sensor simulator    |
//! | `stdin`    | —            | Console byte stream          |
//! | `time`     | Clock        | `std::time::Instant`         |
//! |            | DelayNs      | `std::thread::sleep`         |

pub mod feedback;
pub mod log_sink;
pub mod sim;
pub mod stdin;
pub mod time;
