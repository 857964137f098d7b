use crate::error::{Result, StatsError};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// A live, script-rendered page that can be clicked through.
pub trait LiveSession {
    /// Blocks until a `<table>` exists or `timeout` elapses.
    fn wait_for_table(&mut self, timeout: Duration) -> bool;

    /// Markup of the document as currently rendered.
    fn snapshot(&mut self) -> Result<String>;

    /// Clicks the first element matching `xpath`. `false` if there is none or
    /// it cannot be clicked.
    fn click(&mut self, xpath: &str) -> bool;

    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Headless Chrome tab. The browser process lives exactly as long as this value.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    pub fn launch() -> Result<Self> {
        let launch_options = LaunchOptions {
            headless: true,
            sandbox: false,
            idle_browser_timeout: Duration::from_secs(120),
            ..Default::default()
        };

        let browser = Browser::new(launch_options).map_err(StatsError::browser)?;
        let tab = browser.new_tab().map_err(StatsError::browser)?;
        debug!("Started headless browser session");

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    pub fn open(&mut self, url: &str) -> Result<()> {
        info!("Loading page in browser: {}", url);
        self.tab
            .navigate_to(url)
            .map_err(|e| StatsError::page_load(url, e))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| StatsError::page_load(url, e))?;
        Ok(())
    }
}

impl LiveSession for ChromeSession {
    fn wait_for_table(&mut self, timeout: Duration) -> bool {
        self.tab
            .wait_for_element_with_custom_timeout("table", timeout)
            .is_ok()
    }

    fn snapshot(&mut self) -> Result<String> {
        self.tab.get_content().map_err(StatsError::browser)
    }

    fn click(&mut self, xpath: &str) -> bool {
        match self.tab.find_element_by_xpath(xpath) {
            Ok(element) => element.click().is_ok(),
            Err(_) => false,
        }
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        debug!("Closing headless browser session");
    }
}
