//! Bounded per-channel sample history for the charts, plus the axis scale
//! policies for channels without a natural upper bound.

use std::collections::VecDeque;

/// Samples kept per chart.
pub const CAPACITY: usize = 60;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() == cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Constant axis, e.g. 0..100 for percentages.
    Fixed(f64),
    /// Ceiling follows the running maximum with 10% headroom and never shrinks.
    Growing {
        floor: f64,
        ceiling: f64,
        observed_max: f64,
    },
    /// Ceiling tracks an externally reported capacity plus a margin.
    Allocated { floor: f64, margin: f64, ceiling: f64 },
}

// x*1.1 computed so integral maxima stay exact (110 -> 121, not 121.00000000000001).
fn with_headroom(x: f64) -> f64 {
    (x * 11.0 / 10.0).ceil()
}

impl Scale {
    pub fn growing(floor: f64) -> Self {
        Scale::Growing {
            floor,
            ceiling: floor,
            observed_max: 0.0,
        }
    }

    pub fn allocated(floor: f64, margin: f64) -> Self {
        Scale::Allocated {
            floor,
            margin,
            ceiling: floor,
        }
    }

    pub fn ceiling(&self) -> f64 {
        match *self {
            Scale::Fixed(c) => c,
            Scale::Growing { ceiling, .. } | Scale::Allocated { ceiling, .. } => ceiling,
        }
    }

    fn observe(&mut self, v: f64) {
        if let Scale::Growing {
            floor,
            ceiling,
            observed_max,
        } = self
        {
            if v > *observed_max {
                *observed_max = v;
            }
            if *observed_max > *ceiling {
                *ceiling = with_headroom(*observed_max).max(*floor).max(*ceiling);
            }
        }
    }

    /// Re-aim an allocated-capacity axis at `total + margin`. Returns whether
    /// the ceiling moved. Unknown capacity (`total <= 0`) leaves it alone.
    pub fn retarget(&mut self, total: f64) -> bool {
        let Scale::Allocated {
            floor,
            margin,
            ceiling,
        } = self
        else {
            return false;
        };
        if total <= 0.0 {
            return false;
        }
        let target = (total + *margin).ceil().max(*floor);
        if target == *ceiling {
            return false;
        }
        *ceiling = target;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Cpu,
    Ram,
    Disk,
    NetUp,
    NetDown,
    DbSize,
    MysqlBuffer,
}

impl ChannelId {
    pub const ALL: [ChannelId; 7] = [
        ChannelId::Cpu,
        ChannelId::Ram,
        ChannelId::Disk,
        ChannelId::NetUp,
        ChannelId::NetDown,
        ChannelId::DbSize,
        ChannelId::MysqlBuffer,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChannelId::Cpu => "CPU (%)",
            ChannelId::Ram => "RAM (%)",
            ChannelId::Disk => "Disk (%)",
            ChannelId::NetUp => "Upload (Mbps)",
            ChannelId::NetDown => "Download (Mbps)",
            ChannelId::DbSize => "DB size (MB)",
            ChannelId::MysqlBuffer => "MySQL buffer (MB)",
        }
    }

    pub fn initial_scale(self) -> Scale {
        match self {
            ChannelId::Cpu | ChannelId::Ram | ChannelId::Disk | ChannelId::NetUp => {
                Scale::Fixed(100.0)
            }
            ChannelId::NetDown => Scale::Fixed(200.0),
            ChannelId::DbSize => Scale::growing(100.0),
            ChannelId::MysqlBuffer => Scale::allocated(50.0, 10.0),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone)]
pub struct Channel {
    samples: VecDeque<f64>,
    capacity: usize,
    scale: Scale,
}

impl Channel {
    pub fn new(capacity: usize, scale: Scale) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            scale,
        }
    }

    /// Append, evicting the oldest sample once full.
    pub fn push(&mut self, v: f64) {
        let v = if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.scale.observe(v);
        push_capped(&mut self.samples, v, self.capacity);
    }

    pub fn samples(&self) -> &VecDeque<f64> {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn scale_mut(&mut self) -> &mut Scale {
        &mut self.scale
    }

    pub fn ceiling(&self) -> f64 {
        self.scale.ceiling()
    }
}

/// One channel per chart, created once per session.
#[derive(Debug, Clone)]
pub struct Channels {
    channels: Vec<Channel>,
}

impl Default for Channels {
    fn default() -> Self {
        Self::new(CAPACITY)
    }
}

impl Channels {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: ChannelId::ALL
                .iter()
                .map(|id| Channel::new(capacity, id.initial_scale()))
                .collect(),
        }
    }

    pub fn get(&self, id: ChannelId) -> &Channel {
        &self.channels[id.index()]
    }

    pub fn get_mut(&mut self, id: ChannelId) -> &mut Channel {
        &mut self.channels[id.index()]
    }

    pub fn push(&mut self, id: ChannelId, v: f64) {
        self.get_mut(id).push(v);
    }
}
