#[cfg(windows)]
pub fn set_low_priority() -> anyhow::Result<()> {
  use windows::Win32::System::Threading::{
    GetCurrentProcess, SetPriorityClass, BELOW_NORMAL_PRIORITY_CLASS,
  };
  // SAFETY: Only changes the priority class of the current process.
  unsafe {
    let proc = GetCurrentProcess();
    if SetPriorityClass(proc, BELOW_NORMAL_PRIORITY_CLASS).is_err() {
      return Err(anyhow::anyhow!("SetPriorityClass failed"));
    }
  }
  Ok(())
}

#[cfg(not(windows))]
pub fn set_low_priority() -> anyhow::Result<()> {
  Ok(())
}
