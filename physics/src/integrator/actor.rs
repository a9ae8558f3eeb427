use crate::{
    bitmask_flags::BitmaskFlags,
    collision::Vec3,
    constants::MAX_PITCH_DEG,
    define_bitmask_flags,
};

define_bitmask_flags!(InputFlag, u8, {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    Sprint,
    Sneak,
});

/// Packed key state of one input sample.
pub type InputFlags = BitmaskFlags<u8>;

/// Keys cleared by [`ActorInput::released`].
const MOVEMENT_KEYS: [InputFlag; 5] = [
    InputFlag::Forward,
    InputFlag::Backward,
    InputFlag::Left,
    InputFlag::Right,
    InputFlag::Jump,
];

/// One sample of movement intent.
///
/// `yaw` and `pitch` are absolute look angles in degrees. Yaw 0 faces +Z and yaw -90 faces +X.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActorInput {
    /// Sender-assigned sequence number, strictly increasing per actor. Zero is never valid.
    pub seq: u64,
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub sprint: bool,
    pub sneak: bool,
    pub yaw: f32,
    pub pitch: f32,
}

impl ActorInput {
    /// Decode a packed sample.
    pub fn from_flags(seq: u64, flags: InputFlags, yaw: f32, pitch: f32) -> Self {
        Self {
            seq,
            forward: flags.has(InputFlag::Forward),
            backward: flags.has(InputFlag::Backward),
            left: flags.has(InputFlag::Left),
            right: flags.has(InputFlag::Right),
            jump: flags.has(InputFlag::Jump),
            sprint: flags.has(InputFlag::Sprint),
            sneak: flags.has(InputFlag::Sneak),
            yaw,
            pitch,
        }
    }

    pub fn flags(&self) -> InputFlags {
        let mut flags = InputFlags::default();
        flags.set(InputFlag::Forward, self.forward);
        flags.set(InputFlag::Backward, self.backward);
        flags.set(InputFlag::Left, self.left);
        flags.set(InputFlag::Right, self.right);
        flags.set(InputFlag::Jump, self.jump);
        flags.set(InputFlag::Sprint, self.sprint);
        flags.set(InputFlag::Sneak, self.sneak);
        flags
    }

    /// Same sample with movement and jump keys let go. Sprint, sneak and look are kept.
    pub fn released(&self) -> Self {
        let mut flags = self.flags();
        flags.remove_many(&MOVEMENT_KEYS);
        Self::from_flags(self.seq, flags, self.yaw, self.pitch)
    }

    /// Forward/strafe axes in [-1, 1]; opposing keys cancel.
    #[inline]
    pub fn axes(&self) -> (f32, f32) {
        let axis = |pos: bool, neg: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        (
            axis(self.forward, self.backward),
            axis(self.right, self.left),
        )
    }

    #[inline]
    pub fn has_movement(&self) -> bool {
        self.axes() != (0.0, 0.0)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite()
    }

    /// Yaw wrapped into (-180, 180].
    #[inline]
    pub fn normalized_yaw(&self) -> f32 {
        normalize_yaw_deg(self.yaw)
    }

    #[inline]
    pub fn clamped_pitch(&self) -> f32 {
        self.pitch.clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG)
    }
}

/// Wrap a yaw angle in degrees into (-180, 180].
#[inline]
pub fn normalize_yaw_deg(yaw: f32) -> f32 {
    let wrapped = yaw.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Kinematic state of one actor. Position is the feet (bottom center of the actor box).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActorState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub vel_z: f32,
    pub on_ground: bool,
    pub colliding_horizontally: bool,
}

impl ActorState {
    /// At rest at the given feet position, airborne until the first step says otherwise.
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            ..Self::default()
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        Vec3::new(self.vel_x, self.vel_y, self.vel_z)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position().iter().all(|v| v.is_finite())
            && self.velocity().iter().all(|v| v.is_finite())
    }
}
