//! The fixed catalog of named query pipelines.
//!
//! Each pipeline is available as a plain function over entity slices, and as a
//! [`CatalogQuery`] value that can be evaluated against a [`Repository`] (which is what
//! [`crate::execution::QueryEngine`] does, adding timing and observer events).
//!
//! Inputs are never modified. The discount pipeline returns new [`Product`] values and leaves
//! the repository's products at their original price.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::QueryResult;
use crate::processing::map::{discount, validate_discount_rate};
use crate::processing::predicate::{
    category_equals, category_equals_ignore_case, category_matches, contains_category,
    customer_tier_equals, ordered_on, ordered_within, price_above,
};
use crate::processing::{Pipeline, StageTrace};
use crate::repository::Repository;
use crate::types::{Order, Product};

/// How the category test of [`products_in_category_above_price`] and friends is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMatch {
    /// Single conjunction, exact-case category.
    Exact,
    /// Two chained filters, case-insensitive category.
    IgnoreCase,
    /// Two-argument category predicate (case-insensitive) combined inline with the price test.
    BiPredicate,
}

/// How the total of [`total_price_in_range`] is accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumMethod {
    /// Map to prices, then sum.
    Builtin,
    /// Fold products through [`price_accumulator`].
    Accumulator,
}

// --- product pipelines ---

fn products_above_price_pipeline(
    products: &[Arc<Product>],
    category: &str,
    min_price: f64,
    matching: CategoryMatch,
) -> Pipeline<Arc<Product>> {
    let source = Pipeline::new(products.to_vec());
    match matching {
        CategoryMatch::Exact => {
            source.filter(&category_equals(category).and(price_above(min_price)))
        }
        CategoryMatch::IgnoreCase => source
            .filter(&category_equals_ignore_case(category))
            .filter(&price_above(min_price)),
        CategoryMatch::BiPredicate => {
            let matches = category_matches(false);
            source.filter_with(|p| matches.test(p, category) && p.price > min_price)
        }
    }
}

/// Products whose category is exactly `category` and whose price is strictly above
/// `min_price`, in input order.
pub fn products_in_category_above_price(
    products: &[Arc<Product>],
    category: &str,
    min_price: f64,
) -> Vec<Arc<Product>> {
    products_above_price_pipeline(products, category, min_price, CategoryMatch::Exact).collect()
}

/// Like [`products_in_category_above_price`], but the category comparison ignores case and
/// the two tests are applied as chained filters.
pub fn products_in_category_above_price_ignore_case(
    products: &[Arc<Product>],
    category: &str,
    min_price: f64,
) -> Vec<Arc<Product>> {
    products_above_price_pipeline(products, category, min_price, CategoryMatch::IgnoreCase)
        .collect()
}

/// Like [`products_in_category_above_price_ignore_case`], expressed with a two-argument
/// category predicate.
pub fn products_in_category_above_price_bi_predicate(
    products: &[Arc<Product>],
    category: &str,
    min_price: f64,
) -> Vec<Arc<Product>> {
    products_above_price_pipeline(products, category, min_price, CategoryMatch::BiPredicate)
        .collect()
}

fn discounted_pipeline(
    products: &[Arc<Product>],
    category: &str,
    rate: f64,
) -> QueryResult<Pipeline<Product>> {
    validate_discount_rate(rate)?;
    Ok(Pipeline::new(products.to_vec())
        .filter(&category_equals(category))
        .map(|p| discount(&p, rate)))
}

/// Products in `category` (exact case) with `rate` taken off their price.
///
/// Returns copies; prices never go below zero. A non-finite or negative `rate` is a
/// precondition violation.
pub fn discounted_products_in_category(
    products: &[Arc<Product>],
    category: &str,
    rate: f64,
) -> QueryResult<Vec<Product>> {
    Ok(discounted_pipeline(products, category, rate)?.collect())
}

fn cheapest_pipeline(
    products: &[Arc<Product>],
    category: &str,
    limit: usize,
) -> Pipeline<Arc<Product>> {
    Pipeline::new(products.to_vec())
        .filter(&category_equals(category))
        .sort_by(|a, b| a.price.total_cmp(&b.price))
        .limit(limit)
}

/// The `limit` cheapest products in `category`, cheapest first. Ties keep input order.
pub fn cheapest_products_in_category(
    products: &[Arc<Product>],
    category: &str,
    limit: usize,
) -> Vec<Arc<Product>> {
    cheapest_pipeline(products, category, limit).collect()
}

// --- order pipelines ---

fn containing_category_pipeline(orders: &[Arc<Order>], category: &str) -> Pipeline<Arc<Order>> {
    Pipeline::new(orders.to_vec()).filter(&contains_category(category))
}

/// Orders with at least one product in `category` (case-insensitive).
pub fn orders_containing_category(orders: &[Arc<Order>], category: &str) -> Vec<Arc<Order>> {
    containing_category_pipeline(orders, category).collect()
}

fn distinct_for_tier_pipeline(
    orders: &[Arc<Order>],
    tier: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Pipeline<Arc<Product>> {
    Pipeline::new(orders.to_vec())
        .filter(&customer_tier_equals(tier))
        .filter(&ordered_within(start, end))
        .flat_map(|o| o.products.clone())
        .distinct_by(|p| p.id)
}

/// Distinct products from orders placed by `tier` customers strictly between `start` and
/// `end`. First occurrence order is kept.
pub fn distinct_products_for_tier_in_range(
    orders: &[Arc<Order>],
    tier: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Arc<Product>> {
    distinct_for_tier_pipeline(orders, tier, start, end).collect()
}

fn most_recent_pipeline(orders: &[Arc<Order>], limit: usize) -> Pipeline<Arc<Order>> {
    Pipeline::new(orders.to_vec())
        .sort_by(|a, b| b.order_date.cmp(&a.order_date))
        .limit(limit)
}

/// The `limit` most recently placed orders, newest first. Orders on the same date keep
/// input order.
pub fn most_recent_orders(orders: &[Arc<Order>], limit: usize) -> Vec<Arc<Order>> {
    most_recent_pipeline(orders, limit).collect()
}

fn ordered_on_pipeline<F>(
    orders: &[Arc<Order>],
    date: NaiveDate,
    mut observe: F,
) -> Pipeline<Arc<Product>>
where
    F: FnMut(&Order),
{
    Pipeline::new(orders.to_vec())
        .filter(&ordered_on(date))
        .inspect(|o| observe(&**o))
        .flat_map(|o| o.products.clone())
}

/// Every product line of the orders placed on `date`, in order. Not deduplicated.
pub fn products_ordered_on(orders: &[Arc<Order>], date: NaiveDate) -> Vec<Arc<Product>> {
    ordered_on_pipeline(orders, date, |_| {}).collect()
}

/// Like [`products_ordered_on`], calling `observe` on each matching order before its products
/// are flattened.
pub fn products_ordered_on_with<F>(
    orders: &[Arc<Order>],
    date: NaiveDate,
    observe: F,
) -> Vec<Arc<Product>>
where
    F: FnMut(&Order),
{
    ordered_on_pipeline(orders, date, observe).collect()
}

fn in_range_products_pipeline(
    orders: &[Arc<Order>],
    start: NaiveDate,
    end: NaiveDate,
) -> Pipeline<Arc<Product>> {
    Pipeline::new(orders.to_vec())
        .filter(&ordered_within(start, end))
        .flat_map(|o| o.products.clone())
}

/// Sum of every product line's price over orders placed strictly between `start` and `end`.
pub fn total_price_in_range(orders: &[Arc<Order>], start: NaiveDate, end: NaiveDate) -> f64 {
    in_range_products_pipeline(orders, start, end).sum_by(|p| p.price)
}

/// Default accumulator for [`total_price_in_range_with`].
pub fn price_accumulator(acc: f64, product: &Product) -> f64 {
    acc + product.price
}

/// Same total as [`total_price_in_range`], folded with a caller-supplied accumulator seeded
/// with `0.0`. With [`price_accumulator`] the result is bit-identical to the built-in sum.
pub fn total_price_in_range_with<F>(
    orders: &[Arc<Order>],
    start: NaiveDate,
    end: NaiveDate,
    mut accumulator: F,
) -> f64
where
    F: FnMut(f64, &Product) -> f64,
{
    in_range_products_pipeline(orders, start, end).fold(0.0, |acc, p| accumulator(acc, &*p))
}

// --- named queries ---

/// A catalog pipeline together with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogQuery {
    /// [`products_in_category_above_price`] and its variants.
    ProductsInCategoryAbovePrice {
        category: String,
        min_price: f64,
        matching: CategoryMatch,
    },
    /// [`orders_containing_category`].
    OrdersContainingCategory { category: String },
    /// [`discounted_products_in_category`].
    DiscountedProducts { category: String, rate: f64 },
    /// [`distinct_products_for_tier_in_range`].
    DistinctProductsForTier {
        tier: i32,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// [`cheapest_products_in_category`].
    CheapestProducts { category: String, limit: usize },
    /// [`most_recent_orders`].
    MostRecentOrders { limit: usize },
    /// [`products_ordered_on`].
    ProductsOrderedOn { date: NaiveDate },
    /// [`total_price_in_range`] / [`total_price_in_range_with`].
    TotalPriceInRange {
        start: NaiveDate,
        end: NaiveDate,
        method: SumMethod,
    },
}

/// Result of a catalog pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Shared products from the repository.
    Products(Vec<Arc<Product>>),
    /// Newly created products (discounted copies).
    DiscountedProducts(Vec<Product>),
    /// Shared orders from the repository.
    Orders(Vec<Arc<Order>>),
    /// Scalar aggregate.
    Total(f64),
}

impl QueryOutput {
    /// Number of rows produced; a total counts as one.
    pub fn len(&self) -> usize {
        match self {
            Self::Products(v) => v.len(),
            Self::DiscountedProducts(v) => v.len(),
            Self::Orders(v) => v.len(),
            Self::Total(_) => 1,
        }
    }

    /// `true` for an empty collection. A total is never empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The scalar, if this is a [`QueryOutput::Total`].
    pub fn total(&self) -> Option<f64> {
        match self {
            Self::Total(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for QueryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Products(v) => write_lines(f, v.iter().map(|p| &**p)),
            Self::DiscountedProducts(v) => write_lines(f, v.iter()),
            Self::Orders(v) => write_lines(f, v.iter().map(|o| &**o)),
            Self::Total(t) => write!(f, "total={t}"),
        }
    }
}

fn write_lines<'a, T: fmt::Display + 'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a T>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Output of [`CatalogQuery::evaluate`]: the result plus what each stage produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub output: QueryOutput,
    pub trace: Vec<StageTrace>,
}

impl CatalogQuery {
    /// Stable kebab-case name of the pipeline (parameters are not part of the name).
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProductsInCategoryAbovePrice { matching, .. } => match matching {
                CategoryMatch::Exact => "products-in-category-above-price",
                CategoryMatch::IgnoreCase => "products-in-category-above-price-ignore-case",
                CategoryMatch::BiPredicate => "products-in-category-above-price-bi-predicate",
            },
            Self::OrdersContainingCategory { .. } => "orders-containing-category",
            Self::DiscountedProducts { .. } => "discounted-products",
            Self::DistinctProductsForTier { .. } => "distinct-products-for-tier",
            Self::CheapestProducts { .. } => "cheapest-products",
            Self::MostRecentOrders { .. } => "most-recent-orders",
            Self::ProductsOrderedOn { .. } => "products-ordered-on",
            Self::TotalPriceInRange { method, .. } => match method {
                SumMethod::Builtin => "total-price-in-range",
                SumMethod::Accumulator => "total-price-in-range-accumulator",
            },
        }
    }

    /// The demonstration set: every catalog pipeline with its reference parameters.
    pub fn exercises() -> Vec<CatalogQuery> {
        let books_over_100 = |matching| Self::ProductsInCategoryAbovePrice {
            category: "Books".to_string(),
            min_price: 100.0,
            matching,
        };
        let february = |method| Self::TotalPriceInRange {
            start: date(2021, 1, 31),
            end: date(2021, 3, 1),
            method,
        };
        vec![
            books_over_100(CategoryMatch::Exact),
            books_over_100(CategoryMatch::IgnoreCase),
            books_over_100(CategoryMatch::BiPredicate),
            Self::OrdersContainingCategory {
                category: "Baby".to_string(),
            },
            Self::DiscountedProducts {
                category: "Toys".to_string(),
                rate: 0.1,
            },
            Self::DistinctProductsForTier {
                tier: 2,
                start: date(2021, 2, 1),
                end: date(2021, 4, 1),
            },
            Self::CheapestProducts {
                category: "Books".to_string(),
                limit: 3,
            },
            Self::MostRecentOrders { limit: 3 },
            Self::ProductsOrderedOn {
                date: date(2021, 3, 15),
            },
            february(SumMethod::Builtin),
            february(SumMethod::Accumulator),
        ]
    }

    /// Run the pipeline against a snapshot of `repo`.
    pub fn evaluate<R: Repository + ?Sized>(&self, repo: &R) -> QueryResult<Evaluation> {
        let (output, trace) = match self {
            Self::ProductsInCategoryAbovePrice {
                category,
                min_price,
                matching,
            } => {
                let (items, trace) =
                    products_above_price_pipeline(&repo.products(), category, *min_price, *matching)
                        .into_parts();
                (QueryOutput::Products(items), trace)
            }
            Self::OrdersContainingCategory { category } => {
                let (items, trace) =
                    containing_category_pipeline(&repo.orders(), category).into_parts();
                (QueryOutput::Orders(items), trace)
            }
            Self::DiscountedProducts { category, rate } => {
                let (items, trace) =
                    discounted_pipeline(&repo.products(), category, *rate)?.into_parts();
                (QueryOutput::DiscountedProducts(items), trace)
            }
            Self::DistinctProductsForTier { tier, start, end } => {
                let (items, trace) =
                    distinct_for_tier_pipeline(&repo.orders(), *tier, *start, *end).into_parts();
                (QueryOutput::Products(items), trace)
            }
            Self::CheapestProducts { category, limit } => {
                let (items, trace) =
                    cheapest_pipeline(&repo.products(), category, *limit).into_parts();
                (QueryOutput::Products(items), trace)
            }
            Self::MostRecentOrders { limit } => {
                let (items, trace) = most_recent_pipeline(&repo.orders(), *limit).into_parts();
                (QueryOutput::Orders(items), trace)
            }
            Self::ProductsOrderedOn { date } => {
                let (items, trace) = ordered_on_pipeline(&repo.orders(), *date, |_| {}).into_parts();
                (QueryOutput::Products(items), trace)
            }
            Self::TotalPriceInRange { start, end, method } => {
                let pipeline = in_range_products_pipeline(&repo.orders(), *start, *end);
                let trace = pipeline.trace().to_vec();
                let total = match method {
                    SumMethod::Builtin => pipeline.sum_by(|p| p.price),
                    SumMethod::Accumulator => {
                        pipeline.fold(0.0, |acc, p| price_accumulator(acc, &p))
                    }
                };
                (QueryOutput::Total(total), trace)
            }
        };
        Ok(Evaluation { output, trace })
    }
}

impl fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        match self {
            Self::ProductsInCategoryAbovePrice {
                category,
                min_price,
                ..
            } => write!(f, "(category={category}, min_price={min_price})"),
            Self::OrdersContainingCategory { category } => write!(f, "(category={category})"),
            Self::DiscountedProducts { category, rate } => {
                write!(f, "(category={category}, rate={rate})")
            }
            Self::DistinctProductsForTier { tier, start, end } => {
                write!(f, "(tier={tier}, after={start}, before={end})")
            }
            Self::CheapestProducts { category, limit } => {
                write!(f, "(category={category}, limit={limit})")
            }
            Self::MostRecentOrders { limit } => write!(f, "(limit={limit})"),
            Self::ProductsOrderedOn { date } => write!(f, "(date={date})"),
            Self::TotalPriceInRange { start, end, .. } => {
                write!(f, "(after={start}, before={end})")
            }
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::StageKind;
    use crate::repository::InMemoryRepository;
    use crate::types::Customer;

    fn product(id: u64, category: &str, price: f64) -> Arc<Product> {
        Arc::new(Product::new(id, format!("p{id}"), category, price).unwrap())
    }

    fn ids<T: AsRef<Product>>(items: &[T]) -> Vec<u64> {
        items.iter().map(|p| AsRef::<Product>::as_ref(p).id.0).collect()
    }

    #[test]
    fn books_over_100_end_to_end() {
        let products = vec![
            product(1, "Books", 120.0),
            product(2, "Books", 80.0),
            product(3, "Toys", 50.0),
        ];
        assert_eq!(ids(&products_in_category_above_price(&products, "Books", 100.0)), vec![1]);
    }

    #[test]
    fn cheapest_three_books_end_to_end() {
        let products = vec![
            product(1, "Books", 90.0),
            product(2, "Books", 30.0),
            product(3, "Books", 60.0),
        ];
        assert_eq!(ids(&cheapest_products_in_category(&products, "Books", 3)), vec![2, 3, 1]);
    }

    #[test]
    fn price_variants_agree_when_casing_matches() {
        let products = vec![
            product(1, "Books", 120.0),
            product(2, "Toys", 220.0),
            product(3, "Books", 100.0),
            product(4, "Books", 101.0),
        ];
        let exact = products_in_category_above_price(&products, "Books", 100.0);
        let loose = products_in_category_above_price_ignore_case(&products, "Books", 100.0);
        let bi = products_in_category_above_price_bi_predicate(&products, "Books", 100.0);
        assert_eq!(ids(&exact), vec![1, 4]);
        assert_eq!(exact, loose);
        assert_eq!(exact, bi);
    }

    #[test]
    fn ignore_case_variants_also_match_other_casing() {
        let products = vec![product(1, "books", 120.0), product(2, "BOOKS", 150.0)];
        assert!(products_in_category_above_price(&products, "Books", 100.0).is_empty());
        assert_eq!(
            ids(&products_in_category_above_price_ignore_case(&products, "Books", 100.0)),
            vec![1, 2]
        );
        assert_eq!(
            ids(&products_in_category_above_price_bi_predicate(&products, "Books", 100.0)),
            vec![1, 2]
        );
    }

    #[test]
    fn discount_returns_copies_and_leaves_source() {
        let products = vec![product(1, "Toys", 50.0), product(2, "Books", 10.0), product(3, "Toys", 20.0)];
        let out = discounted_products_in_category(&products, "Toys", 0.1).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].price, 50.0 * (1.0 - 0.1));
        assert_eq!(out[1].price, 20.0 * (1.0 - 0.1));
        assert_eq!(products[0].price, 50.0);
    }

    #[test]
    fn discount_rejects_nan_rate() {
        let err = discounted_products_in_category(&[product(1, "Toys", 5.0)], "Toys", f64::NAN)
            .unwrap_err();
        assert!(err.to_string().contains("discount rate"));
    }

    #[test]
    fn total_price_methods_match_on_empty_input() {
        let start = date(2021, 1, 31);
        let end = date(2021, 3, 1);
        let builtin = total_price_in_range(&[], start, end);
        let folded = total_price_in_range_with(&[], start, end, price_accumulator);
        assert_eq!(builtin.to_bits(), 0.0f64.to_bits());
        assert_eq!(folded.to_bits(), builtin.to_bits());
    }

    #[test]
    fn exercises_cover_every_pipeline_once_by_name() {
        let queries = CatalogQuery::exercises();
        let mut names: Vec<&str> = queries.iter().map(CatalogQuery::name).collect();
        assert_eq!(names.len(), 11);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 11);
    }

    #[test]
    fn evaluate_records_stage_trace() {
        let c = Arc::new(Customer::new(1, "c", 2));
        let p = product(1, "Baby", 3.0);
        let o = Arc::new(Order::new(1, c.clone(), date(2021, 2, 10), vec![p.clone(), p.clone()]));
        let repo = InMemoryRepository::new(vec![p], vec![c], vec![o]).unwrap();

        let eval = CatalogQuery::DistinctProductsForTier {
            tier: 2,
            start: date(2021, 2, 1),
            end: date(2021, 4, 1),
        }
        .evaluate(&repo)
        .unwrap();

        assert_eq!(eval.output.len(), 1);
        let kinds: Vec<StageKind> = eval.trace.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StageKind::Source,
                StageKind::Filter,
                StageKind::Filter,
                StageKind::FlatMap,
                StageKind::Distinct
            ]
        );
        assert_eq!(eval.trace[3].output_len, 2);
    }

    #[test]
    fn cheapest_keeps_input_order_for_equal_prices() {
        let products = vec![
            product(1, "Books", 40.0),
            product(2, "Books", 10.0),
            product(3, "Books", 40.0),
            product(4, "Books", 10.0),
            product(5, "Books", 0.0),
            product(6, "Books", -0.0),
        ];
        assert_eq!(
            ids(&cheapest_products_in_category(&products, "Books", 6)),
            vec![5, 6, 2, 4, 1, 3]
        );
        assert_eq!(ids(&cheapest_products_in_category(&products, "Books", 1)), vec![5]);
    }

    #[test]
    fn ordered_on_observes_each_matching_order_once() {
        let c = Arc::new(Customer::new(1, "c", 1));
        let p = product(1, "Baby", 3.0);
        let day = date(2021, 3, 15);
        let orders = vec![
            Arc::new(Order::new(1, c.clone(), day, vec![p.clone(), p.clone()])),
            Arc::new(Order::new(2, c.clone(), date(2021, 3, 16), vec![p.clone()])),
            Arc::new(Order::new(3, c, day, vec![p])),
        ];

        let mut seen = Vec::new();
        let out = products_ordered_on_with(&orders, day, |o| seen.push(o.id.0));
        assert_eq!(seen, vec![1, 3]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn display_includes_parameters() {
        let q = CatalogQuery::CheapestProducts {
            category: "Books".to_string(),
            limit: 3,
        };
        assert_eq!(q.to_string(), "cheapest-products(category=Books, limit=3)");
    }
}
