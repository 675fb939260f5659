/// One of the four walking directions an input source can hold down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Forward,
        MoveDirection::Backward,
        MoveDirection::Left,
        MoveDirection::Right,
    ];
}

/// A high-level action that any input source (keyboard, touch pad, mouse) can produce.
///
/// The room session consumes actions, never raw platform events, so desktop
/// and touch devices share the same movement and navigation logic.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A direction started being held (key down, touch start).
    MoveStart(MoveDirection),
    /// A direction was released (key up, touch end, pointer left the button).
    MoveEnd(MoveDirection),
    /// Look-around delta in pointer units.
    Look { dx: f32, dy: f32 },
    /// Ask to enter navigation mode (acquire the look lock).
    EnterNavigation,
    /// Ask to leave navigation mode (release the look lock).
    ExitNavigation,
    /// Input that is recognized but not bound to anything.
    Noop,
}
