//! Forwarding messages with trace context attached as metadata.
//!
//! An `orders` handler receives requests from the bus, attaches a trace
//! context it derives from the incoming headers, and forwards the order to an
//! `audit` consumer. The original request is acknowledged once the order has
//! been forwarded.

use courier::{
    Envelope, Message, Result,
    bus::{Address, Consumer, DeliveryOptions, EventBus},
};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
struct TraceContext {
    trace_id: String,
}

async fn handle_orders(bus: EventBus<String>, mut orders: Consumer<String>) -> Result<()> {
    while let Some(message) = orders.recv().await {
        let trace_id = message
            .header("traceparent")
            .unwrap_or("untraced")
            .to_string();
        let order = Envelope::forward(message).add_metadata(TraceContext { trace_id });

        let trace = order
            .metadata_of::<TraceContext>()
            .map(|ctx| ctx.trace_id.clone())
            .unwrap_or_default();
        let origin = order
            .metadata_of::<Address>()
            .map(|address| address.to_string())
            .unwrap_or_default();

        let options = DeliveryOptions::new()
            .header("traceparent", trace)
            .header("origin", origin);
        bus.send_with("audit", order.payload().to_uppercase(), options)
            .await?;

        order.ack().await?;
    }
    Ok(())
}

async fn handle_audit(mut audit: Consumer<String>) -> Result<()> {
    while let Some(message) = audit.recv().await {
        tracing::info!(
            order = %message.payload(),
            trace = message.header("traceparent").unwrap_or_default(),
            origin = message.header("origin").unwrap_or_default(),
            "audited"
        );
    }
    Ok(())
}

/// Wait for a handler task and surface its outcome. A panic in the task is
/// resumed on the caller.
async fn join_handler(name: &str, handle: JoinHandle<Result<()>>) -> Result<()> {
    match handle.await {
        Ok(result) => {
            if let Err(e) = &result {
                tracing::error!(handler = name, error = %e, "handler failed");
            }
            result
        }
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            tracing::warn!(handler = name, error = %e, "handler cancelled");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let bus = EventBus::<String>::default();
    let orders = bus.consumer("orders")?;
    let audit = bus.consumer("audit")?;

    let order_handler = tokio::spawn(handle_orders(bus.clone(), orders));
    let audit_handler = tokio::spawn(handle_audit(audit));

    for (i, trace) in ["trace-a", "trace-b", "trace-c"].into_iter().enumerate() {
        let options = DeliveryOptions::new().header("traceparent", trace);
        let receipt = bus.request("orders", format!("order-{i}"), options).await?;
        receipt.await?;
        tracing::info!(order = i, "order acknowledged");
    }

    bus.shutdown();
    let audited = join_handler("audit", audit_handler).await;
    join_handler("orders", order_handler).await?;
    audited
}

#[cfg(test)]
mod tests {
    use courier::Error;

    use super::*;

    #[tokio::test]
    async fn test_forwarding_failure_reaches_the_caller() {
        let bus = EventBus::<String>::default();
        let orders = bus.consumer("orders").unwrap();
        let handler = tokio::spawn(handle_orders(bus.clone(), orders));

        let receipt = bus
            .request("orders", "order-1".into(), DeliveryOptions::new())
            .await
            .unwrap();

        let result = join_handler("orders", handler).await;
        assert!(matches!(result, Err(Error::NoConsumer(address)) if &*address == "audit"));
        assert!(matches!(receipt.await, Err(Error::AckDropped)));
    }

    #[tokio::test]
    async fn test_handlers_finish_cleanly_on_shutdown() {
        let bus = EventBus::<String>::default();
        let orders = bus.consumer("orders").unwrap();
        let audit = bus.consumer("audit").unwrap();
        let order_handler = tokio::spawn(handle_orders(bus.clone(), orders));
        let audit_handler = tokio::spawn(handle_audit(audit));

        let receipt = bus
            .request("orders", "order-1".into(), DeliveryOptions::new())
            .await
            .unwrap();
        receipt.await.unwrap();

        bus.shutdown();
        join_handler("audit", audit_handler).await.unwrap();
        join_handler("orders", order_handler).await.unwrap();
    }
}
