//! Real-time scheduling helpers (Linux SCHED_FIFO + mlockall).

#[cfg(target_os = "linux")]
pub fn setup_rt_once(rt: bool, prio: Option<i32>) {
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !rt {
        return;
    }

    fn lock_memory() -> std::io::Result<()> {
        // SAFETY: mlockall takes no pointers; failure is reported via errno.
        let rc = unsafe { libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(())
    }

    fn apply_fifo(prio: Option<i32>) -> std::io::Result<i32> {
        // SAFETY: plain integer queries.
        let (min, max) = unsafe {
            (
                libc::sched_get_priority_min(libc::SCHED_FIFO),
                libc::sched_get_priority_max(libc::SCHED_FIFO),
            )
        };
        if min < 0 || max < 0 {
            return Err(std::io::Error::last_os_error());
        }
        let p = prio.unwrap_or(max / 2).clamp(min, max);
        let param = libc::sched_param { sched_priority: p };
        // SAFETY: `param` is a valid sched_param for the duration of the call; pid 0 is self.
        let rc = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(p)
    }

    RT_ONCE.get_or_init(|| {
        match apply_fifo(prio) {
            Ok(p) => tracing::info!(priority = p, "SCHED_FIFO enabled"),
            Err(e) => tracing::warn!(
                error = %e,
                "failed to set SCHED_FIFO; needs CAP_SYS_NICE or root, continuing without it"
            ),
        }
        match lock_memory() {
            Ok(()) => tracing::info!("memory locked (mlockall current|future)"),
            Err(e) => tracing::warn!(
                error = %e,
                "mlockall failed; needs CAP_IPC_LOCK (or root) and sufficient 'ulimit -l'"
            ),
        }
    });
}

#[cfg(not(target_os = "linux"))]
pub fn setup_rt_once(rt: bool, _prio: Option<i32>) {
    if rt {
        tracing::warn!("real-time mode is only supported on Linux; ignoring --rt");
    }
}
