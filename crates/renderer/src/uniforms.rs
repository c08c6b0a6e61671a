use bytemuck::{Pod, Zeroable};
use chrono::{Datelike, Local, Timelike};

use crate::types::CHANNEL_COUNT;

/// CPU mirror of the `ShaderParams` std140 block injected ahead of every shader.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadertoyUniforms {
    pub i_resolution: [f32; 3],
    pub i_global_time: f32,
    pub i_mouse: [f32; 4],
    pub i_date: [f32; 4],
    pub i_sample_rate: f32,
    pub i_time_delta: f32,
    pub i_frame: i32,
    pub padding0: f32,
    /// std140 pads each array element to 16 bytes; only `[n][0]` is read.
    pub i_channel_time: [[f32; 4]; CHANNEL_COUNT],
    pub i_channel_resolution: [[f32; 4]; CHANNEL_COUNT],
}

unsafe impl Zeroable for ShadertoyUniforms {}
unsafe impl Pod for ShadertoyUniforms {}

impl ShadertoyUniforms {
    pub fn new(width: u32, height: u32, sample_rate: f32) -> Self {
        Self {
            i_resolution: [width as f32, height as f32, 0.0],
            i_sample_rate: sample_rate,
            ..Self::zeroed()
        }
    }

    pub fn set_channel_resolution(&mut self, index: usize, width: u32, height: u32) {
        if let Some(slot) = self.i_channel_resolution.get_mut(index) {
            *slot = [width as f32, height as f32, 0.0, 0.0];
        }
    }

    pub fn channel_resolution(&self, index: usize) -> Option<[f32; 3]> {
        self.i_channel_resolution
            .get(index)
            .map(|slot| [slot[0], slot[1], slot[2]])
    }

    /// `iDate`: year, month, day, seconds since local midnight.
    pub fn refresh_date(&mut self) {
        let local_now = Local::now();
        let seconds_since_midnight = local_now.num_seconds_from_midnight() as f32
            + local_now.nanosecond() as f32 / 1_000_000_000.0;
        self.i_date = [
            local_now.year() as f32,
            local_now.month() as f32,
            local_now.day() as f32,
            seconds_since_midnight,
        ];
    }
}
