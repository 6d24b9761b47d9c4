//! Page-context bridge for state that only exists on page globals.
//!
//! GSAP keeps its ScrollTrigger instances on `window`, out of reach of an
//! isolated capture script. [`PAGE_CONTEXT_SCRIPT`] is injected into the
//! page itself and answers `DETECT_SCROLL_ANIMATIONS` with
//! `SCROLL_ANIMATIONS_DETECTED` over `window.postMessage`; it also executes
//! `CONTROL_ANIMATION` commands.
//!
//! The page script may load after the first request, so detection follows
//! a fixed retry timeline ([`RetrySchedule`]). Every offset is measured from
//! the start of detection.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::extract::detect_scroll_animations;
use crate::protocol::{AnimationAction, BridgeMessage, ExtensionMessage};
use crate::types::{GsapTrigger, PageSnapshot, ScrollAnimationRecord};
use crate::Result;

/// Script evaluated in the page's own JS context.
///
/// Reports raw ScrollTrigger facts; normalization happens in
/// [`crate::extract::gsap_records`]. Detected payloads are also parked on
/// `window.__dinspectDetected` for the helper to collect.
pub const PAGE_CONTEXT_SCRIPT: &str = r#"
(() => {
  if (window.__dinspectPageContext) return;
  window.__dinspectPageContext = true;

  const selectorOf = (el) => {
    if (!el) return null;
    try {
      if (el.id) return '#' + el.id;
      if (typeof el.className === 'string') {
        const classes = el.className.trim().split(/\s+/).slice(0, 2);
        if (classes[0]) return '.' + classes.join('.');
      }
      return el.tagName ? el.tagName.toLowerCase() : null;
    } catch (_) {
      return null;
    }
  };

  const scrollTrigger = () => window.ScrollTrigger || (window.gsap && window.gsap.ScrollTrigger) || null;

  const detect = () => {
    const ST = scrollTrigger();
    if (!ST) return [];
    const out = [];
    for (const t of ST.getAll() || []) {
      try {
        const vars = t.vars || {};
        const anim = t.animation;
        let duration = null;
        if (anim && typeof anim.duration === 'function') duration = anim.duration();
        else if (anim && anim.vars && typeof anim.vars.duration === 'number') duration = anim.vars.duration;
        out.push({
          element: selectorOf(t.trigger),
          start: vars.start ? String(vars.start) : null,
          end: vars.end ? String(vars.end) : null,
          scrub: typeof vars.scrub === 'boolean' || typeof vars.scrub === 'number' ? vars.scrub : null,
          pin: !!vars.pin,
          toggleActions: vars.toggleActions ? String(vars.toggleActions) : null,
          markers: !!vars.markers,
          ease: vars.ease ? String(vars.ease) : null,
          tweenVars: anim && anim.vars ? Object.keys(anim.vars) : [],
          duration,
          delay: anim && anim.vars && typeof anim.vars.delay === 'number' ? anim.vars.delay : null,
        });
      } catch (_) {}
    }
    return out;
  };

  const cssTarget = (index) => {
    let current = 0;
    for (const el of document.querySelectorAll('*')) {
      const timeline = getComputedStyle(el).animationTimeline;
      if (timeline && timeline !== 'auto' && timeline !== 'none') {
        if (current === index) return el;
        current++;
      }
    }
    return null;
  };

  const control = ({ animationId, action, value }) => {
    if (animationId.startsWith('gsap-st-')) {
      const ST = scrollTrigger();
      const t = ST && (ST.getAll() || [])[parseInt(animationId.slice(8), 10)];
      if (!t) return;
      if (action === 'restart') { t.refresh(); if (t.animation) t.animation.restart(); }
      if (action === 'play' && t.animation) t.animation.play();
      if (action === 'setProgress' && t.animation) t.animation.progress(value);
      if (action === 'scrollTo') window.scrollTo({ top: t.start, behavior: 'smooth' });
    } else if (animationId.startsWith('css-scroll-')) {
      const el = cssTarget(parseInt(animationId.slice(11), 10));
      if (!el) return;
      for (const a of el.getAnimations()) {
        if (action === 'restart') { a.cancel(); a.play(); }
        if (action === 'setProgress' && a.effect) {
          const d = a.effect.getTiming().duration;
          if (d !== 'auto') a.currentTime = d * value;
        }
      }
    }
  };

  window.addEventListener('message', (event) => {
    const data = event.data || {};
    if (data.type === 'DETECT_SCROLL_ANIMATIONS') {
      window.postMessage({ type: 'SCROLL_ANIMATIONS_DETECTED', animations: detect() }, '*');
    } else if (data.type === 'SCROLL_ANIMATIONS_DETECTED') {
      window.__dinspectDetected = data.animations || [];
    } else if (data.type === 'CONTROL_ANIMATION') {
      try { control(data); } catch (_) {}
    }
  });
})();
"#;

/// One side of the `window.postMessage` channel into the page context.
#[async_trait]
pub trait PageBridge: Send + Sync {
    /// Posts `message` into the page.
    async fn post(&self, message: &BridgeMessage) -> Result<()>;

    /// Takes the most recent `SCROLL_ANIMATIONS_DETECTED` payload, if one arrived.
    async fn take_detected(&self) -> Result<Option<Vec<GsapTrigger>>>;
}

/// Detection timeline: request at 0, read at `first_read`; then for each
/// retry `k` re-request at `k * retry_interval` and read `settle` later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySchedule {
    pub first_read: Duration,
    pub retry_interval: Duration,
    pub settle: Duration,
    pub retries: u32,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            first_read: Duration::from_millis(500),
            retry_interval: Duration::from_millis(2000),
            settle: Duration::from_millis(200),
            retries: 2,
        }
    }
}

/// Outcome of [`detect_gsap_triggers`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub triggers: Vec<GsapTrigger>,
    /// 0 for the first request, `k` for the k-th retry
    pub attempt: u32,
}

impl Detection {
    pub fn found_by_retry(&self) -> bool {
        self.attempt > 0 && !self.triggers.is_empty()
    }
}

/// Requests ScrollTrigger facts, retrying on the fixed timeline until a
/// non-empty answer arrives. Bridge failures count as empty answers.
pub async fn detect_gsap_triggers<B>(bridge: &B, schedule: &RetrySchedule) -> Detection
where
    B: PageBridge + ?Sized,
{
    let start = Instant::now();

    for attempt in 0..=schedule.retries {
        let (request_at, read_at) = if attempt == 0 {
            (start, start + schedule.first_read)
        } else {
            let at = start + schedule.retry_interval * attempt;
            (at, at + schedule.settle)
        };

        sleep_until(request_at).await;
        if let Err(err) = bridge.post(&BridgeMessage::DetectScrollAnimations).await {
            warn!(attempt, error = %err, "failed to post scroll detection request");
        }

        sleep_until(read_at).await;
        match bridge.take_detected().await {
            Ok(Some(triggers)) if !triggers.is_empty() => {
                debug!(attempt, count = triggers.len(), "ScrollTrigger instances reported");
                return Detection { triggers, attempt };
            }
            Ok(_) => debug!(attempt, "no ScrollTrigger data yet"),
            Err(err) => warn!(attempt, error = %err, "failed to read scroll detection reply"),
        }
    }

    Detection {
        triggers: Vec::new(),
        attempt: schedule.retries,
    }
}

/// Full scroll detection for a live page: runs the bridge timeline, folds the
/// triggers into `snapshot`, and runs every detector. When the triggers only
/// showed up on a retry the result is also pushed as
/// `SCROLL_ANIMATIONS_UPDATED` on `updates`.
pub async fn collect_scroll_animations<B>(
    bridge: &B,
    schedule: &RetrySchedule,
    snapshot: &mut PageSnapshot,
    updates: Option<&mpsc::Sender<ExtensionMessage>>,
) -> Vec<ScrollAnimationRecord>
where
    B: PageBridge + ?Sized,
{
    let detection = detect_gsap_triggers(bridge, schedule).await;
    let announce = detection.found_by_retry();
    snapshot.gsap_triggers = detection.triggers;
    let records = detect_scroll_animations(&snapshot.document());

    if announce {
        if let Some(tx) = updates {
            let update = ExtensionMessage::ScrollAnimationsUpdated {
                scroll_animations: records.clone(),
            };
            if tx.send(update).await.is_err() {
                debug!("scroll update receiver dropped");
            }
        }
    }
    records
}

/// Posts a playback command for a detected animation.
///
/// Only `gsap-st-*` and `css-scroll-*` ids are controllable; CSS timelines
/// understand `restart` and `setProgress` only.
pub async fn control_animation<B>(
    bridge: &B,
    animation_id: &str,
    action: AnimationAction,
    value: Option<f64>,
) -> Result<bool>
where
    B: PageBridge + ?Sized,
{
    let controllable = if animation_id.starts_with("gsap-st-") {
        true
    } else if animation_id.starts_with("css-scroll-") {
        matches!(action, AnimationAction::Restart | AnimationAction::SetProgress)
    } else {
        false
    };
    if !controllable {
        debug!(animation_id, %action, "animation is not controllable; ignoring");
        return Ok(false);
    }

    bridge
        .post(&BridgeMessage::ControlAnimation {
            animation_id: animation_id.to_string(),
            action,
            value: value.map(|v| v.clamp(0.0, 1.0)),
        })
        .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InspectError;
    use std::sync::Mutex;

    /// Replies with triggers once `ready_after` requests have been posted.
    struct ScriptedBridge {
        ready_after: usize,
        triggers: Vec<GsapTrigger>,
        start: Instant,
        posts: Mutex<Vec<(Duration, BridgeMessage)>>,
        reads: Mutex<Vec<Duration>>,
    }

    impl ScriptedBridge {
        fn new(ready_after: usize) -> Self {
            Self {
                ready_after,
                triggers: vec![GsapTrigger {
                    element: Some("#hero".into()),
                    ..GsapTrigger::default()
                }],
                start: Instant::now(),
                posts: Mutex::new(Vec::new()),
                reads: Mutex::new(Vec::new()),
            }
        }

        fn post_times(&self) -> Vec<u128> {
            let posts = self.posts.lock().unwrap();
            posts.iter().map(|(at, _)| at.as_millis()).collect()
        }

        fn read_times(&self) -> Vec<u128> {
            let reads = self.reads.lock().unwrap();
            reads.iter().map(|at| at.as_millis()).collect()
        }
    }

    #[async_trait]
    impl PageBridge for ScriptedBridge {
        async fn post(&self, message: &BridgeMessage) -> Result<()> {
            self.posts
                .lock()
                .unwrap()
                .push((self.start.elapsed(), message.clone()));
            Ok(())
        }

        async fn take_detected(&self) -> Result<Option<Vec<GsapTrigger>>> {
            self.reads.lock().unwrap().push(self.start.elapsed());
            let posted = self.posts.lock().unwrap().len();
            if posted >= self.ready_after {
                Ok(Some(self.triggers.clone()))
            } else {
                Ok(Some(Vec::new()))
            }
        }
    }

    struct BrokenBridge;

    #[async_trait]
    impl PageBridge for BrokenBridge {
        async fn post(&self, _message: &BridgeMessage) -> Result<()> {
            Err(InspectError::browser("page closed"))
        }

        async fn take_detected(&self) -> Result<Option<Vec<GsapTrigger>>> {
            Err(InspectError::browser("page closed"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_answer_is_read_after_half_a_second() {
        let bridge = ScriptedBridge::new(1);
        let detection = detect_gsap_triggers(&bridge, &RetrySchedule::default()).await;

        assert_eq!(detection.attempt, 0);
        assert!(!detection.found_by_retry());
        assert_eq!(bridge.post_times(), vec![0]);
        assert_eq!(bridge.read_times(), vec![500]);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_follow_the_fixed_timeline() {
        let bridge = ScriptedBridge::new(usize::MAX);
        let detection = detect_gsap_triggers(&bridge, &RetrySchedule::default()).await;

        assert!(detection.triggers.is_empty());
        assert_eq!(bridge.post_times(), vec![0, 2000, 4000]);
        assert_eq!(bridge.read_times(), vec![500, 2200, 4200]);
    }

    #[tokio::test(start_paused = true)]
    async fn late_triggers_are_announced_as_update() {
        let bridge = ScriptedBridge::new(2);
        let (tx, mut rx) = mpsc::channel(4);
        let mut snapshot = PageSnapshot::new("https://example.com");

        let records =
            collect_scroll_animations(&bridge, &RetrySchedule::default(), &mut snapshot, Some(&tx))
                .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "gsap-st-0");
        assert_eq!(snapshot.gsap_triggers.len(), 1);
        assert_eq!(bridge.post_times(), vec![0, 2000]);
        match rx.try_recv() {
            Ok(ExtensionMessage::ScrollAnimationsUpdated { scroll_animations }) => {
                assert_eq!(scroll_animations, records)
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_pass_results_are_not_announced() {
        let bridge = ScriptedBridge::new(1);
        let (tx, mut rx) = mpsc::channel(4);
        let mut snapshot = PageSnapshot::new("https://example.com");

        collect_scroll_animations(&bridge, &RetrySchedule::default(), &mut snapshot, Some(&tx))
            .await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn bridge_failures_degrade_to_empty() {
        let detection = detect_gsap_triggers(&BrokenBridge, &RetrySchedule::default()).await;
        assert!(detection.triggers.is_empty());
    }

    #[tokio::test]
    async fn control_forwards_only_supported_commands() {
        let bridge = ScriptedBridge::new(usize::MAX);

        assert!(control_animation(&bridge, "gsap-st-1", AnimationAction::SetProgress, Some(1.7))
            .await
            .unwrap());
        assert!(!control_animation(&bridge, "css-scroll-0", AnimationAction::ScrollTo, None)
            .await
            .unwrap());
        assert!(!control_animation(&bridge, "aos-3", AnimationAction::Restart, None)
            .await
            .unwrap());

        let posts = bridge.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(
            posts[0].1,
            BridgeMessage::ControlAnimation {
                animation_id: "gsap-st-1".into(),
                action: AnimationAction::SetProgress,
                value: Some(1.0),
            }
        );
    }
}
