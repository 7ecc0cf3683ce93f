//! Target configuration
//!
//! Backs `POST /target_angle`. The first accepted target activates
//! tracking; there is no way to deactivate it again short of a restart.

use deflect_protocol::TargetRequest;

use crate::state::{TargetSpec, TargetWriter};

pub struct TargetConfigService<'a> {
    writer: TargetWriter<'a>,
}

impl<'a> TargetConfigService<'a> {
    pub fn new(writer: TargetWriter<'a>) -> Self {
        Self { writer }
    }

    /// Publish a validated target and return the resulting spec
    pub fn set_target(&self, request: TargetRequest) -> TargetSpec {
        self.writer.publish(request.angle_deg)
    }
}
