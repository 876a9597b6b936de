//! Actions of [`AtariEnv`](crate::AtariEnv).

/// Joystick actions of the Atari 2600.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum AtariAction {
    Noop = 0,
    Fire = 1,
    Up = 2,
    Right = 3,
    Left = 4,
    Down = 5,
    UpRight = 6,
    UpLeft = 7,
    DownRight = 8,
    DownLeft = 9,
    UpFire = 10,
    RightFire = 11,
    LeftFire = 12,
    DownFire = 13,
    UpRightFire = 14,
    UpLeftFire = 15,
    DownRightFire = 16,
    DownLeftFire = 17,
}

impl AtariAction {
    /// Converts an emulator action code.
    pub fn from_i32(v: i32) -> Option<Self> {
        use AtariAction::*;
        let a = match v {
            0 => Noop,
            1 => Fire,
            2 => Up,
            3 => Right,
            4 => Left,
            5 => Down,
            6 => UpRight,
            7 => UpLeft,
            8 => DownRight,
            9 => DownLeft,
            10 => UpFire,
            11 => RightFire,
            12 => LeftFire,
            13 => DownFire,
            14 => UpRightFire,
            15 => UpLeftFire,
            16 => DownRightFire,
            17 => DownLeftFire,
            _ => return None,
        };
        Some(a)
    }
}

/// Action of [`AtariEnv`](crate::AtariEnv): an index into the minimal action
/// set of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtariAct {
    pub act: usize,
}

impl AtariAct {
    pub fn new(act: usize) -> Self {
        Self { act }
    }
}

impl From<usize> for AtariAct {
    fn from(act: usize) -> Self {
        Self { act }
    }
}
