use super::*;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SpotPrice {
    data: SpotPriceData,
}

#[derive(Debug, Deserialize)]
struct SpotPriceData {
    amount: String,
}

pub(crate) fn parse_spot_price(body: &str) -> Result<f64> {
    let spot: SpotPrice = serde_json::from_str(body).context("malformed spot price response")?;

    let amount = spot
        .data
        .amount
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid spot price `{}`", spot.data.amount))?;

    ensure!(
        amount.is_finite() && amount >= 0.0,
        "invalid spot price `{amount}`"
    );

    Ok(amount)
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<f64> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    parse_spot_price(&body)
}

/// Polls `url` every `refresh` and stores the latest price in the coordinator.
/// Failures are logged and the previous price is kept.
pub(crate) fn spawn_price_feed(
    url: String,
    refresh: Duration,
    coordinator: Coordinator,
    cancel: CancellationToken,
    tasks: &mut JoinSet<()>,
) -> Result {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to create HTTP client")?;

    tasks.spawn(async move {
        let mut ticker = interval(refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => match fetch(&client, &url).await {
                    Ok(price) => {
                        debug!("Spot price: {price}");
                        coordinator.set_price(price);
                    }
                    Err(err) => warn!("Failed to fetch spot price from {url}: {err:#}"),
                },
            }
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spot_price() {
        assert_eq!(
            parse_spot_price(r#"{"data":{"base":"BTC","currency":"USD","amount":"64123.45"}}"#)
                .unwrap(),
            64123.45
        );
    }

    #[test]
    fn rejects_missing_amount() {
        assert!(parse_spot_price(r#"{"data":{}}"#).is_err());
        assert!(parse_spot_price("[]").is_err());
    }

    #[test]
    fn rejects_non_numeric_amount() {
        assert!(parse_spot_price(r#"{"data":{"amount":"lots"}}"#).is_err());
        assert!(parse_spot_price(r#"{"data":{"amount":"-1"}}"#).is_err());
        assert!(parse_spot_price(r#"{"data":{"amount":"inf"}}"#).is_err());
    }
}
