diesel::table! {
    inventory (product_id) {
        product_id -> Int4,
        quantity -> Int4,
    }
}

diesel::table! {
    movements (id) {
        id -> Int4,
        product_id -> Int4,
        quantity_change -> Int4,
    }
}

diesel::table! {
    products (id) {
        id -> Int4,
        #[max_length = 100]
        name -> Varchar,
        price -> Float8,
        #[max_length = 255]
        description -> Nullable<Varchar>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    inventory,
    movements,
    products,
);
