// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fit probe against a container that is resized a few times.
//!
//! Forty 40x18 items, one 18px-high row. After every resize the search is
//! reset and driven to completion against the headless `FlowHost`.
//!
//! Run:
//! - `cargo run -p understory_demos --example fit_probe_resize`
//! - `RUST_LOG=understory_fit_probe=trace cargo run -p understory_demos --example fit_probe_resize`
//!   to watch the probe move.

use kurbo::Size;
use tracing_subscriber::EnvFilter;
use understory_fit_probe::{Error, FitProbe, FitProbeConfig, FlowHost};
use understory_visibility::Thresholds;

const ITEM: Size = Size::new(40.0, 18.0);
const ITEMS: usize = 40;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut host = FlowHost::new(Size::new(220.0, ITEM.height), ITEM)?;
    let mut probe = FitProbe::new(FitProbeConfig::new(ITEMS));

    for width in [220.0, 410.0, 1000.0, 2000.0, 39.0, 120.0] {
        host.resize(Size::new(width, ITEM.height));
        probe.reset();
        let fit = host.settle(&mut probe, 32)?;
        println!(
            "width {width:>6.1}: {} of {ITEMS} items fit ({} sensors created so far)",
            fit.map_or_else(|| "?".to_string(), |n| n.to_string()),
            probe.observer().stats().created,
        );
    }

    // Count partially visible items too.
    let config = FitProbeConfig::new(ITEMS).with_thresholds(Thresholds::single(0.25)?);
    let mut loose = FitProbe::new(config);
    host.resize(Size::new(220.0, 27.0));
    let fit = host.settle(&mut loose, 32)?;
    println!("220x27 with a 25% threshold: {fit:?}");

    Ok(())
}
