// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 安装 Prometheus 导出器并登记指标说明
pub fn init_metrics(address: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = address.parse()?;

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return Ok(());
    }

    describe_counter!(
        "tvbox_source_resolutions_total",
        "Top-level source resolutions by final status"
    );
    describe_counter!(
        "tvbox_subsource_fetches_total",
        "Recursive sub-source resolutions by outcome"
    );
    describe_counter!(
        "tvbox_cache_lookups_total",
        "Cache lookups by tier and result"
    );
    describe_counter!(
        "tvbox_cache_purged_total",
        "Expired cache entries removed by the sweeper"
    );
    describe_counter!(
        "tvbox_aggregations_total",
        "Aggregation requests by cache outcome"
    );

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
