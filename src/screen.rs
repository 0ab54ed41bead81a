use crate::{
    error::StoreError,
    store::{ScreenInfo, ScreenInfoProvider},
};

/// Screen size straight from the OS, used when the widget center runs without
/// the HTTP backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemScreenInfo;

impl ScreenInfoProvider for SystemScreenInfo {
    fn screen_info(&self) -> Result<ScreenInfo, StoreError> {
        let (width, height) = primary_screen_size()?;
        Ok(ScreenInfo::from_size(width, height))
    }
}

#[cfg(windows)]
fn primary_screen_size() -> Result<(f64, f64), StoreError> {
    use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

    let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
    if width <= 0 || height <= 0 {
        return Err(StoreError::Unavailable(
            "GetSystemMetrics reported no primary screen".to_string(),
        ));
    }
    Ok((width as f64, height as f64))
}

#[cfg(not(windows))]
fn primary_screen_size() -> Result<(f64, f64), StoreError> {
    Err(StoreError::Unavailable(
        "no native screen query on this platform".to_string(),
    ))
}
