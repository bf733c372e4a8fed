use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use std::sync::Arc;
use std::time::Duration;

use cartview_carts::{ShoppingCartDetails, get_shopping_cart_details_query};
use cartview_core::{ClientId, QueryHandler, ShoppingCartId, if_none_match_satisfied, to_weak_etag};
use cartview_infra::config::ReadModelRetrySettings;
use cartview_infra::queries::GetShoppingCartDetailsHandler;
use cartview_infra::read_model::{InMemoryShoppingCartDetailsStore, ShoppingCartDetailsStore};
use chrono::Utc;

fn bench_etag(c: &mut Criterion) {
    let mut group = c.benchmark_group("etag");

    group.bench_function("to_weak_etag", |b| {
        b.iter(|| to_weak_etag(black_box(123_456u64)))
    });

    group.bench_function("if_none_match_satisfied", |b| {
        b.iter(|| if_none_match_satisfied(black_box(r#"W/"1", W/"2", W/"123456""#), black_box(123_456)))
    });

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("get_shopping_cart_details");

    for carts in [100usize, 10_000] {
        let store = Arc::new(InMemoryShoppingCartDetailsStore::new());
        rt.block_on(async {
            for i in 0..carts {
                let details = ShoppingCartDetails::opened(
                    ShoppingCartId::new(format!("cart-{i}")).unwrap(),
                    ClientId::new("client-1").unwrap(),
                    Utc::now(),
                );
                store.insert(details).await.unwrap();
            }
        });

        let handler = GetShoppingCartDetailsHandler::new(
            store,
            ReadModelRetrySettings {
                max_attempts: 1,
                delay: Duration::ZERO,
                deadline: None,
            },
        );
        let handler = &handler;
        let target = format!("cart-{}", carts / 2);

        group.bench_with_input(BenchmarkId::new("visible_row", carts), &target, |b, target| {
            b.to_async(&rt).iter(move || async move {
                let query = get_shopping_cart_details_query(Some(target.as_str())).unwrap();
                black_box(handler.handle(query).await.unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_etag, bench_lookup);
criterion_main!(benches);
