//! Real-time scheduling helpers.
//!
//! Alarm delivery latency depends on the scheduling class of the thread
//! parked in `wait`. These helpers apply a SCHED_FIFO request to the
//! calling thread on Linux and are no-ops elsewhere.

/// Apply a scheduling class to the calling thread.
///
/// `real_time = true` requests SCHED_FIFO at `priority` (1-99);
/// `real_time = false` reverts to SCHED_OTHER. Returns `true` on success.
/// Typically requires `CAP_SYS_NICE` or an rtprio limit.
#[cfg(target_os = "linux")]
pub fn set_thread_scheduler(real_time: bool, priority: i32) -> bool {
    use tracing::warn;

    let (policy, prio) = if real_time {
        (libc::SCHED_FIFO, priority)
    } else {
        (libc::SCHED_OTHER, 0)
    };
    let param = libc::sched_param {
        sched_priority: prio,
    };
    let ret = unsafe { libc::sched_setscheduler(0, policy, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        warn!("sched_setscheduler(policy={policy}, priority={prio}) failed: {err}");
        return false;
    }
    true
}

/// Apply a scheduling class to the calling thread (non-Linux: no-op).
#[cfg(not(target_os = "linux"))]
pub fn set_thread_scheduler(_real_time: bool, _priority: i32) -> bool {
    false
}

/// Detect whether the calling thread already runs under an RT policy.
pub fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        use libc::{SCHED_FIFO, SCHED_RR, sched_getscheduler};
        unsafe {
            let policy = sched_getscheduler(0);
            policy == SCHED_FIFO || policy == SCHED_RR
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}
