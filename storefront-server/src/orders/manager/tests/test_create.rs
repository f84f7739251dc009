use super::*;
use std::thread;

#[test]
fn test_cod_order_at_free_shipping_threshold() {
    let ctx = create_test_manager();
    let a = ctx.add_product("Brass Lamp", 500, 10);

    let order = ctx.place(&customer(), &[(&a.id, 2)], PaymentMethod::Cod);

    assert_eq!(order.subtotal, Decimal::from(1000));
    assert_eq!(order.tax, Decimal::from(180));
    assert_eq!(order.shipping_cost, Decimal::ZERO);
    assert_eq!(order.total, Decimal::from(1180));
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(order.payment_info.status, PaymentStatus::Pending);
    assert_eq!(order.items[0].unit_price, Decimal::from(500));
    assert_eq!(ctx.stock_of(&a.id), 8);
}

#[test]
fn test_online_order_starts_processing() {
    let ctx = create_test_manager();
    let a = ctx.add_product("Brass Lamp", 500, 10);

    let card = ctx.place(&customer(), &[(&a.id, 2)], PaymentMethod::Card);
    assert_eq!(card.order_status, OrderStatus::Processing);

    let razorpay = ctx.place(&customer(), &[(&a.id, 1)], PaymentMethod::Razorpay);
    assert_eq!(razorpay.order_status, OrderStatus::Processing);
    assert_eq!(razorpay.shipping_cost, Decimal::from(100));
    assert_eq!(ctx.stock_of(&a.id), 7);
}

#[test]
fn test_order_is_persisted_with_server_totals() {
    let ctx = create_test_manager();
    let a = ctx.add_product("Notebook", 120, 10);
    let b = ctx.add_product("Pencil", 15, 50);

    let order = ctx.place(&customer(), &[(&a.id, 3), (&b.id, 4)], PaymentMethod::Cod);
    assert_eq!(order.subtotal, Decimal::from(420));
    assert_eq!(order.tax, Decimal::new(7560, 2));
    assert_eq!(order.total, order.subtotal + order.tax + order.shipping_cost);

    let stored = ctx.manager.get_order(&order.id, &customer()).unwrap();
    assert_eq!(stored, order);
}

#[test]
fn test_price_captured_at_purchase() {
    let ctx = create_test_manager();
    let a = ctx.add_product("Diary", 300, 10);
    let order = ctx.place(&customer(), &[(&a.id, 1)], PaymentMethod::Cod);

    ctx.products
        .update(
            &a.id,
            crate::db::models::ProductUpdate {
                price: Some(Decimal::from(999)),
                ..Default::default()
            },
        )
        .unwrap();

    let stored = ctx.manager.get_order(&order.id, &customer()).unwrap();
    assert_eq!(stored.items[0].unit_price, Decimal::from(300));
    assert_eq!(stored.subtotal, Decimal::from(300));
}

#[test]
fn test_duplicate_lines_are_merged() {
    let ctx = create_test_manager();
    let a = ctx.add_product("Card", 50, 5);

    let order = ctx.place(&customer(), &[(&a.id, 2), (&a.id, 3)], PaymentMethod::Cod);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 5);
    assert_eq!(ctx.stock_of(&a.id), 0);
}

#[test]
fn test_out_of_stock_reserves_nothing() {
    let ctx = create_test_manager();
    let a = ctx.add_product("Pen", 10, 5);
    let b = ctx.add_product("Ink", 10, 5);
    let c = ctx.add_product("Nib", 10, 1);

    let err = ctx
        .manager
        .create_order(
            &customer(),
            order_request(&[(&a.id, 2), (&b.id, 2), (&c.id, 2)], PaymentMethod::Cod),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ManagerError::OutOfStock { ref product_id, requested: 2, available: 1 } if *product_id == c.id
    ));
    assert_eq!(ctx.stock_of(&a.id), 5);
    assert_eq!(ctx.stock_of(&b.id), 5);
    assert_eq!(ctx.stock_of(&c.id), 1);
}

#[test]
fn test_missing_product_is_not_found() {
    let ctx = create_test_manager();
    let a = ctx.add_product("Pen", 10, 5);

    let err = ctx
        .manager
        .create_order(
            &customer(),
            order_request(&[(&a.id, 1), ("ghost", 1)], PaymentMethod::Cod),
        )
        .unwrap_err();
    assert!(matches!(err, ManagerError::ProductNotFound(ref id) if id == "ghost"));
    assert_eq!(ctx.stock_of(&a.id), 5);
}

#[test]
fn test_empty_cart_and_zero_quantity() {
    let ctx = create_test_manager();
    let a = ctx.add_product("Pen", 10, 5);

    let err = ctx
        .manager
        .create_order(&customer(), order_request(&[], PaymentMethod::Cod))
        .unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));

    let err = ctx
        .manager
        .create_order(&customer(), order_request(&[(&a.id, 0)], PaymentMethod::Cod))
        .unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));
    assert_eq!(ctx.stock_of(&a.id), 5);
}

#[test]
fn test_quote_does_not_reserve() {
    let ctx = create_test_manager();
    let a = ctx.add_product("Frame", 800, 3);

    let quote = ctx.manager.quote(&order_request(&[(&a.id, 2)], PaymentMethod::Cod).items).unwrap();
    assert_eq!(quote.totals.subtotal, Decimal::from(1600));
    assert_eq!(quote.totals.shipping_cost, Decimal::ZERO);
    assert_eq!(ctx.stock_of(&a.id), 3);

    let err = ctx
        .manager
        .quote(&order_request(&[(&a.id, 4)], PaymentMethod::Cod).items)
        .unwrap_err();
    assert!(matches!(err, ManagerError::OutOfStock { .. }));
}

#[test]
fn test_concurrent_orders_never_oversell() {
    let ctx = Arc::new(create_test_manager());
    let a = ctx.add_product("Limited Edition", 100, 3);

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let ctx = ctx.clone();
            let id = a.id.clone();
            thread::spawn(move || {
                ctx.manager
                    .create_order(
                        &Actor::customer(format!("buyer-{i}")),
                        order_request(&[(&id, 1)], PaymentMethod::Cod),
                    )
                    .is_ok()
            })
        })
        .collect();

    let placed = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(placed, 3);
    assert_eq!(ctx.stock_of(&a.id), 0);
    let page = ctx.manager.list_orders(&OrderFilter::default(), 20).unwrap();
    assert_eq!(page.total_orders, 3);
}

#[test]
fn test_out_of_range_amount_is_rejected_without_reserving() {
    let ctx = create_test_manager();
    let a = ctx.add_product("Gold Leaf Album", 1, 20_000);
    ctx.products
        .update(
            &a.id,
            crate::db::models::ProductUpdate {
                price: Some(Decimal::from_i128_with_scale(10_i128.pow(25), 0)),
                ..Default::default()
            },
        )
        .unwrap();

    let err = ctx
        .manager
        .create_order(&customer(), order_request(&[(&a.id, 10_000)], PaymentMethod::Cod))
        .unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));
    assert_eq!(ctx.stock_of(&a.id), 20_000);

    let err = ctx.manager.quote(&[OrderItemRequest {
        product: a.id.clone(),
        quantity: 10_000,
    }]);
    assert!(matches!(err, Err(ManagerError::Validation(_))));
}
