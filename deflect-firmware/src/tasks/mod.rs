//! Embassy async tasks
//!
//! Each task runs independently. Telemetry flows through the shared state;
//! the server start/stop requests go through `channels`.

pub mod battery;
pub mod http_server;
pub mod indicator;
pub mod measure;
pub mod wifi;

pub use battery::{battery_task, BatteryAdc};
pub use http_server::http_server_task;
pub use indicator::{indicator_task, PwmPixel};
pub use measure::{measure_task, PrimaryImu};
pub use wifi::{access_point_task, init_radio, RadioResources};
