use crate::tracking::actions::{MouseButton, PointerAction};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PointerError {
    #[error("pointer backend unavailable: {0}")]
    Unavailable(String),
    #[error("pointer command failed: {0}")]
    Command(String),
}

/// Platform cursor actuation.
pub trait PointingDevice: Send + 'static {
    fn move_x(&mut self, delta: i32) -> Result<(), PointerError>;
    fn move_y(&mut self, delta: i32) -> Result<(), PointerError>;
    fn press_left(&mut self) -> Result<(), PointerError>;
    fn release_left(&mut self) -> Result<(), PointerError>;
    fn press_right(&mut self) -> Result<(), PointerError>;
    fn release_right(&mut self) -> Result<(), PointerError>;
    /// Primary-button click.
    fn click(&mut self) -> Result<(), PointerError>;
    fn current_position(&self) -> (i32, i32);
    fn screen_size(&self) -> (u32, u32);
}

fn press<P: PointingDevice + ?Sized>(device: &mut P, button: MouseButton) -> Result<(), PointerError> {
    match button {
        MouseButton::Left => device.press_left(),
        MouseButton::Right => device.press_right(),
    }
}

fn release<P: PointingDevice + ?Sized>(
    device: &mut P,
    button: MouseButton,
) -> Result<(), PointerError> {
    match button {
        MouseButton::Left => device.release_left(),
        MouseButton::Right => device.release_right(),
    }
}

fn click<P: PointingDevice + ?Sized>(device: &mut P, button: MouseButton) -> Result<(), PointerError> {
    match button {
        MouseButton::Left => device.click(),
        MouseButton::Right => {
            device.press_right()?;
            device.release_right()
        }
    }
}

/// Drive `device` with one classified action.
pub fn apply_action<P: PointingDevice + ?Sized>(
    device: &mut P,
    action: PointerAction,
) -> Result<(), PointerError> {
    match action {
        PointerAction::Press(b) => press(device, b),
        PointerAction::Release(b) => release(device, b),
        PointerAction::Click(b) => click(device, b),
        PointerAction::DoubleClick(b) => {
            click(device, b)?;
            click(device, b)
        }
    }
}

/// Move the cursor by a mapped delta, skipping zero axes and clamping to the screen.
pub fn apply_motion<P: PointingDevice + ?Sized>(
    device: &mut P,
    dx: i32,
    dy: i32,
) -> Result<(), PointerError> {
    let (x, y) = device.current_position();
    let (width, height) = device.screen_size();
    let max_x = i32::try_from(width).unwrap_or(i32::MAX).saturating_sub(1);
    let max_y = i32::try_from(height).unwrap_or(i32::MAX).saturating_sub(1);

    let dx = x.saturating_add(dx).clamp(0, max_x.max(0)) - x;
    let dy = y.saturating_add(dy).clamp(0, max_y.max(0)) - y;

    if dx != 0 {
        device.move_x(dx)?;
    }
    if dy != 0 {
        device.move_y(dy)?;
    }
    Ok(())
}

/// Logs every actuation instead of driving a real cursor.
#[derive(Debug, Clone)]
pub struct DryRunPointer {
    position: (i32, i32),
    screen: (u32, u32),
    left_down: bool,
    right_down: bool,
    clicks: u64,
}

impl DryRunPointer {
    pub fn new(width: u32, height: u32) -> Self {
        let cx = i32::try_from(width / 2).unwrap_or(0);
        let cy = i32::try_from(height / 2).unwrap_or(0);
        Self {
            position: (cx, cy),
            screen: (width, height),
            left_down: false,
            right_down: false,
            clicks: 0,
        }
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left_down,
            MouseButton::Right => self.right_down,
        }
    }

    pub fn clicks(&self) -> u64 {
        self.clicks
    }
}

impl Default for DryRunPointer {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl PointingDevice for DryRunPointer {
    fn move_x(&mut self, delta: i32) -> Result<(), PointerError> {
        self.position.0 = self.position.0.saturating_add(delta);
        tracing::debug!(delta, x = self.position.0, "dry-run move x");
        Ok(())
    }

    fn move_y(&mut self, delta: i32) -> Result<(), PointerError> {
        self.position.1 = self.position.1.saturating_add(delta);
        tracing::debug!(delta, y = self.position.1, "dry-run move y");
        Ok(())
    }

    fn press_left(&mut self) -> Result<(), PointerError> {
        self.left_down = true;
        tracing::info!("dry-run press left");
        Ok(())
    }

    fn release_left(&mut self) -> Result<(), PointerError> {
        self.left_down = false;
        tracing::info!("dry-run release left");
        Ok(())
    }

    fn press_right(&mut self) -> Result<(), PointerError> {
        self.right_down = true;
        tracing::info!("dry-run press right");
        Ok(())
    }

    fn release_right(&mut self) -> Result<(), PointerError> {
        self.right_down = false;
        tracing::info!("dry-run release right");
        Ok(())
    }

    fn click(&mut self) -> Result<(), PointerError> {
        self.clicks += 1;
        tracing::info!(clicks = self.clicks, "dry-run click");
        Ok(())
    }

    fn current_position(&self) -> (i32, i32) {
        self.position
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }
}
