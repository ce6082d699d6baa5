mod helpers;

use tally_ledger::Transition;

#[tokio::test]
async fn history_projects_the_audit_log_in_order() -> anyhow::Result<()> {
    let pool = helpers::init_pool().await?;
    let ledger = helpers::init_ledger(&pool).await?;

    let user = helpers::unique_id("USER");
    let pool_account = helpers::unique_id("POOL");
    helpers::seed_account(&pool, &user, "USD", 100_000).await?;
    helpers::seed_account(&pool, &pool_account, "USD", 100_000).await?;

    ledger
        .post_journal(helpers::reserve_lock_journal(
            &helpers::unique_id("J"),
            &helpers::unique_id("idem"),
            &user,
            &pool_account,
            "25.00",
        ))
        .await?;
    ledger
        .post_journal(helpers::reserve_lock_journal(
            &helpers::unique_id("J"),
            &helpers::unique_id("idem"),
            &user,
            &pool_account,
            "10.00",
        ))
        .await?;

    let history = ledger.entries().history(user.clone().into(), None).await?;
    assert_eq!(history.account_id.as_str(), user);
    assert_eq!(history.currency.code(), "USD");
    assert_eq!(history.history.len(), 2);
    assert_eq!(history.history[0].transition, Transition::Reserve);
    assert_eq!(history.history[0].amount, "25");
    assert_eq!(history.history[1].amount, "10");
    assert!(history.history[0].timestamp <= history.history[1].timestamp);

    Ok(())
}

#[tokio::test]
async fn history_filters_by_currency() -> anyhow::Result<()> {
    let pool = helpers::init_pool().await?;
    let ledger = helpers::init_ledger(&pool).await?;

    let user = helpers::unique_id("USER");
    let pool_account = helpers::unique_id("POOL");
    helpers::seed_account(&pool, &user, "USD", 100_000).await?;
    helpers::seed_account(&pool, &pool_account, "USD", 100_000).await?;

    ledger
        .post_journal(helpers::reserve_lock_journal(
            &helpers::unique_id("J"),
            &helpers::unique_id("idem"),
            &user,
            &pool_account,
            "5.00",
        ))
        .await?;

    let usd = ledger
        .entries()
        .history(user.clone().into(), Some("USD".parse().unwrap()))
        .await?;
    assert_eq!(usd.history.len(), 1);
    assert_eq!(usd.currency.code(), "USD");

    // the filter value wins even when nothing matches
    let eur = ledger
        .entries()
        .history(user.clone().into(), Some("EUR".parse().unwrap()))
        .await?;
    assert!(eur.history.is_empty());
    assert_eq!(eur.currency.code(), "EUR");

    Ok(())
}

#[tokio::test]
async fn an_unknown_account_has_an_empty_usd_history() -> anyhow::Result<()> {
    let pool = helpers::init_pool().await?;
    let ledger = helpers::init_ledger(&pool).await?;

    let history = ledger
        .entries()
        .history(helpers::unique_id("GHOST").into(), None)
        .await?;
    assert!(history.history.is_empty());
    assert_eq!(history.currency.code(), "USD");

    Ok(())
}
