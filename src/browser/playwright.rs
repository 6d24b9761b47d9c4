//! Playwright integration for headless browser automation.
//!
//! This module contains the inline Playwright session script, error mapping,
//! and availability checks for Node.js and Playwright.

use crate::{InspectError, Result};
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Long-lived Playwright helper. Reads one JSON request per stdin line
/// (`{id, method, params}`) and answers each with `{id, result}` or
/// `{id, error: {message}}` on stdout.
pub(crate) const SESSION_SCRIPT: &str = r#"
const [, headlessFlag] = process.argv;
const readline = require('readline');

let browser;
let page;

function installCapture() {
  window.__dinspectCapture = (properties) => {
    const nodes = [];
    let nextId = 0;

    function styleOf(el) {
      const style = window.getComputedStyle(el);
      const out = {};
      for (const prop of properties) {
        const value = style.getPropertyValue(prop);
        if (value !== '') out[prop] = value;
      }
      return out;
    }

    function ownText(el) {
      const tag = el.tagName.toLowerCase();
      if (tag === 'script' || tag === 'style') {
        return el.textContent || null;
      }
      let text = null;
      for (const child of el.childNodes) {
        if (child.nodeType === Node.TEXT_NODE) {
          const trimmed = child.textContent.trim();
          if (trimmed) text = text ? text + ' ' + trimmed : trimmed;
        }
      }
      return text;
    }

    function traverse(el, parentId) {
      const id = `n${nextId++}`;
      const tag = el.tagName.toLowerCase();
      const rect = el.getBoundingClientRect();
      const attributes = {};
      for (const attr of el.attributes) attributes[attr.name] = attr.value;

      const node = {
        id,
        tag,
        children: [],
        parent: parentId,
        attributes,
        text: ownText(el),
        boundingBox: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
        computedStyle: styleOf(el)
      };
      if (tag === 'img') {
        node.naturalSize = { width: el.naturalWidth || 0, height: el.naturalHeight || 0 };
      }
      if (tag === 'svg' && !(el.parentElement && el.parentElement.closest('svg'))) {
        node.markup = el.outerHTML;
      }
      nodes.push(node);

      if (tag !== 'svg') {
        for (const child of el.children) {
          node.children.push(traverse(child, id));
        }
      }
      return id;
    }

    traverse(document.documentElement, null);

    const probes = ['ScrollTrigger', 'gsap', 'ScrollMagic', 'LocomotiveScroll', 'AOS', 'Lenis'];
    const globals = probes.filter((name) => typeof window[name] !== 'undefined');
    if (window.gsap && window.gsap.ScrollTrigger) globals.push('gsap.ScrollTrigger');

    const bodyText = document.body ? document.body.innerText.replace(/\s+/g, ' ').trim() : '';
    return {
      url: window.location.href,
      title: document.title,
      baseUrl: document.baseURI,
      devicePixelRatio: window.devicePixelRatio || 1,
      viewport: { width: window.innerWidth, height: window.innerHeight },
      htmlLength: document.documentElement.outerHTML.length,
      bodyTextLength: bodyText.length,
      pageGlobals: globals,
      nodes
    };
  };
}

function requirePage() {
  if (!page) throw new Error('No page is open');
  return page;
}

const handlers = {
  ping: async () => 'pong',
  open: async ({ url, width, height, navTimeout, idleTimeout }) => {
    const { chromium } = require('playwright');
    browser = await chromium.launch({ headless: headlessFlag !== '0' });
    const context = await browser.newContext({ viewport: { width, height } });
    page = await context.newPage();
    await page.goto(url, { waitUntil: 'networkidle', timeout: navTimeout });
    await page.waitForLoadState('networkidle', { timeout: idleTimeout });
    await page.evaluate(installCapture);
    return { url: page.url() };
  },
  inject: async () => {
    await requirePage().evaluate(installCapture);
    return true;
  },
  snapshot: async ({ properties }) => {
    return requirePage().evaluate((props) => {
      if (typeof window.__dinspectCapture !== 'function') {
        throw new Error('Capture script is not loaded');
      }
      return window.__dinspectCapture(props);
    }, properties);
  },
  evaluatePageContext: async ({ script }) => {
    await requirePage().evaluate(script);
    return true;
  },
  post: async ({ message }) => {
    await requirePage().evaluate((msg) => window.postMessage(msg, '*'), message);
    return true;
  },
  takeDetected: async () => {
    return requirePage().evaluate(() => {
      const detected = window.__dinspectDetected || null;
      window.__dinspectDetected = null;
      return detected;
    });
  },
  screenshot: async () => {
    const buffer = await requirePage().screenshot({ type: 'png', fullPage: false });
    return 'data:image/png;base64,' + buffer.toString('base64');
  },
  highlight: async ({ selector }) => {
    return requirePage().evaluate((sel) => {
      const el = document.querySelector(sel);
      if (!el) return false;
      el.scrollIntoView({ behavior: 'smooth', block: 'center' });
      const previous = el.style.outline;
      el.style.outline = '2px solid #f43f5e';
      setTimeout(() => { el.style.outline = previous; }, 2000);
      return true;
    }, selector);
  },
  reveal: async ({ selector }) => {
    return requirePage().evaluate((sel) => {
      const el = document.querySelector(sel);
      if (!el) return false;
      el.scrollIntoView({ behavior: 'instant', block: 'center', inline: 'center' });
      return true;
    }, selector);
  },
  close: async () => {
    if (browser) await browser.close();
    browser = undefined;
    page = undefined;
    return true;
  }
};

const rl = readline.createInterface({ input: process.stdin });
rl.on('line', async (line) => {
  if (!line.trim()) return;
  let request;
  try {
    request = JSON.parse(line);
  } catch (err) {
    console.error('unparseable request: ' + line.slice(0, 200));
    return;
  }
  const { id, method, params } = request;
  const handler = handlers[method];
  try {
    if (!handler) throw new Error('Unknown method ' + method);
    const result = await handler(params || {});
    process.stdout.write(JSON.stringify({ id, result: result === undefined ? null : result }) + '\n');
  } catch (err) {
    const message = err && err.message ? err.message : String(err);
    process.stdout.write(JSON.stringify({ id, error: { message } }) + '\n');
  }
  if (method === 'close') process.exit(0);
});
rl.on('close', async () => {
  if (browser) await browser.close();
  process.exit(0);
});
"#;

/// Computed properties recorded for every element of a snapshot.
pub(crate) const CAPTURED_PROPERTIES: &[&str] = &[
    "display",
    "visibility",
    "opacity",
    "position",
    "z-index",
    "width",
    "height",
    "max-width",
    "flex-direction",
    "justify-content",
    "align-items",
    "flex-wrap",
    "gap",
    "grid-template-columns",
    "grid-template-rows",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "line-height",
    "text-align",
    "text-decoration",
    "color",
    "background-color",
    "background-image",
    "border",
    "border-width",
    "border-color",
    "border-radius",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "box-shadow",
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "fill",
    "object-fit",
    "animation-name",
    "animation-timeline",
    "animation-timing-function",
    "animation-duration",
    "animation-delay",
];

/// Timeout for checking node/playwright availability.
pub(crate) const NODE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Script to check if Playwright is installed.
const PLAYWRIGHT_CHECK_SCRIPT: &str = "require('playwright'); process.stdout.write('ok');";

const MISSING_PLAYWRIGHT: &str =
    "Playwright npm package is missing; install with `npm install playwright`.";

/// Maps a spawn error to an appropriate InspectError.
pub(crate) fn map_spawn_error(err: io::Error, command: &str) -> InspectError {
    if err.kind() == io::ErrorKind::NotFound {
        InspectError::browser(format!(
            "Unable to spawn Playwright helper; '{}' was not found on PATH",
            command
        ))
    } else {
        InspectError::Io(err)
    }
}

/// Maps Playwright stderr output to an appropriate InspectError.
pub(crate) fn map_playwright_error(status_text: impl Into<String>, stderr: &str) -> InspectError {
    let lower = stderr.to_ascii_lowercase();

    if lower.contains("cannot find module 'playwright'") {
        return InspectError::browser(MISSING_PLAYWRIGHT);
    }

    if lower.contains("timeout") {
        return InspectError::browser(
            "Playwright timed out; try increasing --nav-timeout/--network-idle-timeout, and ensure the page finishes loading.",
        );
    }

    InspectError::browser(format!(
        "Playwright exited with status {}: {}",
        status_text.into(),
        stderr.trim()
    ))
}

/// Maps an error message returned by a session method.
pub(crate) fn map_method_error(method: &str, message: String) -> InspectError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("cannot find module 'playwright'") {
        InspectError::browser(MISSING_PLAYWRIGHT)
    } else if lower.contains("timeout") {
        InspectError::browser(format!(
            "Playwright error ({method}): {message}. Hint: increase --nav-timeout/--network-idle-timeout, and ensure the page finishes loading."
        ))
    } else {
        InspectError::browser(format!("Playwright error ({method}): {message}"))
    }
}

/// Skips the Playwright package probe, for environments that stub the helper.
pub(crate) fn is_probe_skipped() -> bool {
    std::env::var("DINSPECT_SKIP_PLAYWRIGHT_CHECK").is_ok()
}

/// Ensures Node.js is available on the system.
pub(crate) async fn ensure_node_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let status = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.status())
        .await
        .map_err(|_| {
            InspectError::browser(format!(
                "Timed out checking node availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !status.success() {
        return Err(InspectError::browser(format!(
            "Node command {:?} is not available (exit {})",
            node_command, status
        )));
    }

    Ok(())
}

/// Ensures Playwright npm package is installed.
pub(crate) async fn ensure_playwright_available(node_command: &str) -> Result<()> {
    if is_probe_skipped() {
        return Ok(());
    }

    let mut cmd = Command::new(node_command);
    cmd.arg("-e")
        .arg(PLAYWRIGHT_CHECK_SCRIPT)
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let output = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.output())
        .await
        .map_err(|_| {
            InspectError::browser(format!(
                "Timed out checking Playwright availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(map_playwright_error(
            format!("{:?}", output.status),
            &stderr,
        ));
    }

    Ok(())
}
