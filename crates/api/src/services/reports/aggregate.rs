use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, FixedOffset, Utc};
use infra::models::{BookRow, BorrowedBookRow, UserRow};
use serde::Serialize;
use uuid::Uuid;

use super::{ReportDataset, ReportFilters, UNCATEGORIZED, UNKNOWN_CAMPUS, UNKNOWN_USER};

const ACTIVE_USERS_LIMIT: usize = 20;
const TREND_CATEGORY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusActivity {
    pub name: String,
    pub borrow_count: u64,
    pub active_borrows: u64,
    pub returned_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookActivityReport {
    pub data: Vec<CampusActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyGrowth {
    pub month: String,
    pub count: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserGrowthReport {
    pub data: Vec<MonthlyGrowth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampusCategories {
    pub campus: String,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryComparison {
    pub name: String,
    pub total_borrows: u64,
    pub unique_users: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPopularityReport {
    pub data: Vec<CategoryCount>,
    pub total_categories: usize,
    pub total_borrows: u64,
    pub top_category: Option<String>,
    pub categories: Vec<String>,
    pub campuses: Vec<String>,
    pub campus_analysis: Vec<CampusCategories>,
    /// One object per month: `{"month": "2025-06", "<category>": count, ...}`.
    pub trend_data: Vec<serde_json::Map<String, serde_json::Value>>,
    pub trend_categories: Vec<String>,
    pub comparison_categories: Vec<CategoryComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub rank: usize,
    pub name: String,
    pub email: String,
    pub borrow_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveUsersReport {
    pub data: Vec<ActiveUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampusBudget {
    pub name: String,
    pub budget: f64,
    pub income: f64,
    pub expense: f64,
    pub fines: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusBudgetsReport {
    pub data: Vec<CampusBudget>,
    pub total_budget: f64,
    pub avg_budget: f64,
    pub campus_count: usize,
    /// Paid fines and transactions that belong to no known campus. Kept out
    /// of `data` and the totals.
    pub unattributed_budget: f64,
}

/// Lookups shared by the borrow-based reports.
struct BorrowView<'a> {
    books: HashMap<Uuid, &'a BookRow>,
    campus_names: HashMap<Uuid, &'a str>,
    filters: &'a ReportFilters,
    offset: FixedOffset,
}

impl<'a> BorrowView<'a> {
    fn new(dataset: &'a ReportDataset, filters: &'a ReportFilters, offset: FixedOffset) -> Self {
        Self {
            books: dataset.books.iter().map(|b| (b.id, b)).collect(),
            campus_names: dataset
                .campuses
                .iter()
                .map(|c| (c.id, c.name.as_str()))
                .collect(),
            filters,
            offset,
        }
    }

    fn campus_of(&self, borrow: &BorrowedBookRow) -> Option<Uuid> {
        borrow
            .campus_id
            .or_else(|| self.books.get(&borrow.book_id).and_then(|b| b.campus_id))
    }

    fn category_of(&self, borrow: &'a BorrowedBookRow) -> &'a str {
        borrow
            .category
            .as_deref()
            .or_else(|| {
                self.books
                    .get(&borrow.book_id)
                    .copied()
                    .map(|b| b.category.as_str())
            })
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(UNCATEGORIZED)
    }

    fn campus_name(&self, campus_id: Option<Uuid>) -> String {
        campus_id
            .and_then(|id| self.campus_names.get(&id).copied())
            .unwrap_or(UNKNOWN_CAMPUS)
            .to_string()
    }

    fn selected(&self, borrow: &BorrowedBookRow) -> bool {
        self.filters.in_range(borrow.borrowed_at, self.offset)
            && self.filters.in_campus(self.campus_of(borrow))
    }

    fn month(&self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.offset).format("%Y-%m").to_string()
    }
}

fn display_name(user: &UserRow) -> String {
    user.display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_USER)
        .to_string()
}

/// Counts sorted by count desc, then key asc.
fn ranked(counts: HashMap<&str, u64>) -> Vec<CategoryCount> {
    let mut rows: Vec<_> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    rows
}

pub fn book_activity_by_campus(
    dataset: &ReportDataset,
    filters: &ReportFilters,
    offset: FixedOffset,
) -> BookActivityReport {
    let view = BorrowView::new(dataset, filters, offset);
    let mut by_campus: HashMap<Option<Uuid>, CampusActivity> = dataset
        .campuses
        .iter()
        .filter(|c| filters.in_campus(Some(c.id)))
        .map(|c| {
            (
                Some(c.id),
                CampusActivity {
                    name: c.name.clone(),
                    borrow_count: 0,
                    active_borrows: 0,
                    returned_count: 0,
                },
            )
        })
        .collect();

    for borrow in dataset.borrows.iter().filter(|b| view.selected(b)) {
        let campus = view.campus_of(borrow);
        let known = campus.filter(|id| view.campus_names.contains_key(id));
        let entry = by_campus.entry(known).or_insert_with(|| CampusActivity {
            name: view.campus_name(known),
            borrow_count: 0,
            active_borrows: 0,
            returned_count: 0,
        });
        entry.borrow_count += 1;
        if borrow.returned_at.is_some() {
            entry.returned_count += 1;
        } else {
            entry.active_borrows += 1;
        }
    }

    let mut data: Vec<_> = by_campus.into_values().collect();
    data.sort_by(|a, b| {
        b.borrow_count
            .cmp(&a.borrow_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    BookActivityReport { data }
}

pub fn user_growth(
    dataset: &ReportDataset,
    filters: &ReportFilters,
    offset: FixedOffset,
) -> UserGrowthReport {
    let mut per_month: BTreeMap<String, u64> = BTreeMap::new();
    for user in dataset
        .users
        .iter()
        .filter(|u| filters.in_range(u.created_at, offset) && filters.in_campus(u.campus_id))
    {
        let month = user.created_at.with_timezone(&offset).format("%Y-%m").to_string();
        *per_month.entry(month).or_default() += 1;
    }

    let mut total = 0;
    let data = per_month
        .into_iter()
        .map(|(month, count)| {
            total += count;
            MonthlyGrowth {
                month,
                count,
                total,
            }
        })
        .collect();
    UserGrowthReport { data }
}

pub fn category_popularity(
    dataset: &ReportDataset,
    filters: &ReportFilters,
    offset: FixedOffset,
) -> CategoryPopularityReport {
    let view = BorrowView::new(dataset, filters, offset);
    let selected: Vec<&BorrowedBookRow> =
        dataset.borrows.iter().filter(|b| view.selected(b)).collect();

    let mut totals: HashMap<&str, u64> = HashMap::new();
    let mut readers: HashMap<&str, HashSet<Uuid>> = HashMap::new();
    let mut per_campus: BTreeMap<String, HashMap<&str, u64>> = BTreeMap::new();
    let mut per_month: BTreeMap<String, HashMap<&str, u64>> = BTreeMap::new();

    for &borrow in &selected {
        let category = view.category_of(borrow);
        *totals.entry(category).or_default() += 1;
        readers.entry(category).or_default().insert(borrow.user_id);
        *per_campus
            .entry(view.campus_name(view.campus_of(borrow)))
            .or_default()
            .entry(category)
            .or_default() += 1;
        *per_month
            .entry(view.month(borrow.borrowed_at))
            .or_default()
            .entry(category)
            .or_default() += 1;
    }

    let data = ranked(totals);
    let trend_categories: Vec<String> = data
        .iter()
        .take(TREND_CATEGORY_LIMIT)
        .map(|c| c.category.clone())
        .collect();

    let trend_data = per_month
        .into_iter()
        .map(|(month, counts)| {
            let mut point = serde_json::Map::new();
            point.insert("month".into(), month.into());
            for category in &trend_categories {
                let count = counts.get(category.as_str()).copied().unwrap_or(0);
                point.insert(category.clone(), count.into());
            }
            point
        })
        .collect();

    let compared: Vec<String> = if filters.categories.is_empty() {
        data.iter().map(|c| c.category.clone()).collect()
    } else {
        filters.categories.clone()
    };
    let comparison_categories = compared
        .into_iter()
        .map(|name| {
            let total_borrows = data
                .iter()
                .find(|c| c.category == name)
                .map_or(0, |c| c.count);
            let unique_users = readers.get(name.as_str()).map_or(0, |r| r.len() as u64);
            CategoryComparison {
                name,
                total_borrows,
                unique_users,
            }
        })
        .collect();

    let categories: BTreeSet<String> = dataset
        .books
        .iter()
        .map(|b| b.category.clone())
        .chain(data.iter().map(|c| c.category.clone()))
        .filter(|c| !c.trim().is_empty())
        .collect();

    CategoryPopularityReport {
        total_categories: data.len(),
        total_borrows: selected.len() as u64,
        top_category: data.first().map(|c| c.category.clone()),
        categories: categories.into_iter().collect(),
        campuses: dataset.campuses.iter().map(|c| c.name.clone()).collect(),
        campus_analysis: per_campus
            .into_iter()
            .map(|(campus, counts)| CampusCategories {
                campus,
                categories: ranked(counts),
            })
            .collect(),
        trend_data,
        trend_categories,
        comparison_categories,
        data,
    }
}

pub fn active_users(
    dataset: &ReportDataset,
    filters: &ReportFilters,
    offset: FixedOffset,
) -> ActiveUsersReport {
    let view = BorrowView::new(dataset, filters, offset);
    let users: HashMap<Uuid, &UserRow> = dataset.users.iter().map(|u| (u.id, u)).collect();

    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for borrow in dataset.borrows.iter().filter(|b| view.selected(b)) {
        *counts.entry(borrow.user_id).or_default() += 1;
    }

    let mut rows: Vec<(String, String, u64)> = counts
        .into_iter()
        .map(|(user_id, count)| match users.get(&user_id) {
            Some(user) => (display_name(user), user.email.clone(), count),
            None => (UNKNOWN_USER.to_string(), String::new(), count),
        })
        .collect();
    rows.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)).then_with(|| a.1.cmp(&b.1)));

    let data = rows
        .into_iter()
        .take(ACTIVE_USERS_LIMIT)
        .enumerate()
        .map(|(i, (name, email, borrow_count))| ActiveUser {
            rank: i + 1,
            name,
            email,
            borrow_count,
        })
        .collect();
    ActiveUsersReport { data }
}

pub fn campus_budgets(
    dataset: &ReportDataset,
    filters: &ReportFilters,
    offset: FixedOffset,
) -> CampusBudgetsReport {
    let view = BorrowView::new(dataset, filters, offset);

    #[derive(Default)]
    struct Ledger {
        income: f64,
        expense: f64,
        fines: f64,
    }

    impl Ledger {
        fn budget(&self) -> f64 {
            self.fines + self.income - self.expense
        }
    }

    let mut ledgers: HashMap<Uuid, Ledger> = dataset
        .campuses
        .iter()
        .filter(|c| filters.in_campus(Some(c.id)))
        .map(|c| (c.id, Ledger::default()))
        .collect();
    let mut unattributed = Ledger::default();

    for borrow in dataset.borrows.iter().filter(|b| view.selected(b)) {
        if borrow.fine_status.as_deref() != Some("paid") {
            continue;
        }
        let ledger = match view.campus_of(borrow).and_then(|id| ledgers.get_mut(&id)) {
            Some(ledger) => ledger,
            None => &mut unattributed,
        };
        ledger.fines += borrow.fine_amount.unwrap_or(0.0);
    }

    for tx in dataset
        .transactions
        .iter()
        .filter(|t| filters.in_range(t.date, offset) && filters.in_campus(t.campus_id))
    {
        let ledger = match tx.campus_id.and_then(|id| ledgers.get_mut(&id)) {
            Some(ledger) => ledger,
            None => &mut unattributed,
        };
        match tx.kind.as_str() {
            "income" => ledger.income += tx.amount,
            "expense" => ledger.expense += tx.amount,
            _ => {}
        }
    }

    let mut data: Vec<CampusBudget> = ledgers
        .into_iter()
        .map(|(id, ledger)| CampusBudget {
            name: view.campus_name(Some(id)),
            budget: ledger.budget(),
            income: ledger.income,
            expense: ledger.expense,
            fines: ledger.fines,
        })
        .collect();
    data.sort_by(|a, b| {
        b.budget
            .total_cmp(&a.budget)
            .then_with(|| a.name.cmp(&b.name))
    });

    let total_budget: f64 = data.iter().map(|c| c.budget).sum();
    let campus_count = data.len();
    let avg_budget = if campus_count == 0 {
        0.0
    } else {
        total_budget / campus_count as f64
    };

    CampusBudgetsReport {
        data,
        total_budget,
        avg_budget,
        campus_count,
        unattributed_budget: unattributed.budget(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use infra::models::{CampusRow, TransactionRow};

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    struct Fixture {
        dataset: ReportDataset,
        kuzey: Uuid,
    }

    fn campus(id: Uuid, name: &str) -> CampusRow {
        CampusRow {
            id,
            name: name.into(),
            status: "active".into(),
            created_at: at(2024, 1, 1),
            updated_at: at(2024, 1, 1),
        }
    }

    fn user(id: Uuid, name: Option<&str>, email: &str, created: DateTime<Utc>) -> UserRow {
        UserRow {
            id,
            email: email.into(),
            display_name: name.map(Into::into),
            role: "user".into(),
            campus_id: None,
            student_class: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn borrow(
        user_id: Uuid,
        campus_id: Option<Uuid>,
        category: &str,
        when: DateTime<Utc>,
        returned: bool,
    ) -> BorrowedBookRow {
        BorrowedBookRow {
            id: Uuid::new_v4(),
            user_id,
            book_id: Uuid::new_v4(),
            campus_id,
            category: Some(category.into()),
            borrowed_at: when,
            returned_at: returned.then(|| when + chrono::Duration::days(7)),
            fine_amount: None,
            fine_status: None,
        }
    }

    fn fixture() -> Fixture {
        let merkez = Uuid::new_v4();
        let kuzey = Uuid::new_v4();
        let ayse = Uuid::new_v4();
        let mehmet = Uuid::new_v4();

        let mut fined = borrow(mehmet, Some(kuzey), "Roman", at(2025, 5, 20), true);
        fined.fine_amount = Some(15.0);
        fined.fine_status = Some("paid".into());
        let mut unpaid = borrow(ayse, Some(kuzey), "Bilim", at(2025, 5, 21), false);
        unpaid.fine_amount = Some(40.0);
        unpaid.fine_status = Some("unpaid".into());

        let dataset = ReportDataset {
            campuses: vec![campus(merkez, "Merkez"), campus(kuzey, "Kuzey")],
            users: vec![
                user(ayse, Some("Ayşe"), "ayse@okul.edu.tr", at(2025, 4, 2)),
                user(mehmet, None, "mehmet@okul.edu.tr", at(2025, 5, 3)),
            ],
            books: vec![],
            borrows: vec![
                borrow(ayse, Some(merkez), "Roman", at(2025, 6, 1), false),
                borrow(ayse, Some(merkez), "Roman", at(2025, 6, 2), true),
                borrow(ayse, None, "Tarih", at(2025, 6, 3), true),
                fined,
                unpaid,
            ],
            transactions: vec![
                TransactionRow {
                    id: Uuid::new_v4(),
                    campus_id: Some(merkez),
                    kind: "income".into(),
                    amount: 100.0,
                    description: None,
                    date: at(2025, 6, 1),
                },
                TransactionRow {
                    id: Uuid::new_v4(),
                    campus_id: Some(merkez),
                    kind: "expense".into(),
                    amount: 30.0,
                    description: None,
                    date: at(2025, 6, 2),
                },
            ],
        };

        Fixture { dataset, kuzey }
    }

    #[test]
    fn activity_groups_unknown_campus_separately() {
        let f = fixture();
        let report = book_activity_by_campus(&f.dataset, &ReportFilters::default(), offset());

        let names: Vec<_> = report.data.iter().map(|r| r.name.as_str()).collect();
        // Ties on count fall back to the campus name.
        assert_eq!(names, vec!["Kuzey", "Merkez", UNKNOWN_CAMPUS]);
        assert_eq!(report.data[1].borrow_count, 2);
        assert_eq!(report.data[1].active_borrows, 1);
        assert_eq!(report.data[1].returned_count, 1);
        assert_eq!(report.data[2].borrow_count, 1);
    }

    #[test]
    fn campus_filter_narrows_activity() {
        let f = fixture();
        let filters = ReportFilters {
            campus: Some(f.kuzey),
            ..Default::default()
        };
        let report = book_activity_by_campus(&f.dataset, &filters, offset());
        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].name, "Kuzey");
        assert_eq!(report.data[0].borrow_count, 2);
    }

    #[test]
    fn growth_is_cumulative_by_month() {
        let f = fixture();
        let report = user_growth(&f.dataset, &ReportFilters::default(), offset());
        assert_eq!(
            report.data,
            vec![
                MonthlyGrowth {
                    month: "2025-04".into(),
                    count: 1,
                    total: 1
                },
                MonthlyGrowth {
                    month: "2025-05".into(),
                    count: 1,
                    total: 2
                },
            ]
        );
    }

    #[test]
    fn category_popularity_ranks_and_compares() {
        let f = fixture();
        let filters = ReportFilters {
            categories: vec!["Roman".into(), "Şiir".into()],
            ..Default::default()
        };
        let report = category_popularity(&f.dataset, &filters, offset());

        assert_eq!(report.top_category.as_deref(), Some("Roman"));
        assert_eq!(report.total_borrows, 5);
        assert_eq!(report.total_categories, 3);
        assert_eq!(report.trend_categories, vec!["Roman", "Bilim", "Tarih"]);
        assert_eq!(report.trend_data.len(), 2);
        assert_eq!(report.trend_data[1]["Roman"], 2);
        assert_eq!(
            report.comparison_categories,
            vec![
                CategoryComparison {
                    name: "Roman".into(),
                    total_borrows: 3,
                    unique_users: 2
                },
                CategoryComparison {
                    name: "Şiir".into(),
                    total_borrows: 0,
                    unique_users: 0
                },
            ]
        );
    }

    #[test]
    fn active_users_rank_by_count_with_placeholder_names() {
        let f = fixture();
        let report = active_users(&f.dataset, &ReportFilters::default(), offset());

        assert_eq!(report.data[0].name, "Ayşe");
        assert_eq!(report.data[0].borrow_count, 4);
        assert_eq!(report.data[1].name, UNKNOWN_USER);
        assert_eq!(report.data[1].email, "mehmet@okul.edu.tr");
        assert_eq!(report.data[1].rank, 2);
    }

    #[test]
    fn date_filter_is_inclusive_local_dates() {
        let f = fixture();
        let filters = ReportFilters {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 2),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 3),
            ..Default::default()
        };
        let report = active_users(&f.dataset, &filters, offset());
        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].borrow_count, 2);
    }

    #[test]
    fn budget_is_paid_fines_plus_income_minus_expense() {
        let f = fixture();
        let report = campus_budgets(&f.dataset, &ReportFilters::default(), offset());

        assert_eq!(report.campus_count, 2);
        assert_eq!(report.data[0].name, "Merkez");
        assert_eq!(report.data[0].budget, 70.0);
        assert_eq!(report.data[1].name, "Kuzey");
        assert_eq!(report.data[1].budget, 15.0);
        assert_eq!(report.total_budget, 85.0);
        assert_eq!(report.avg_budget, 42.5);
        assert_eq!(report.unattributed_budget, 0.0);
    }

    #[test]
    fn unattributed_money_does_not_count_as_a_campus() {
        let mut f = fixture();
        f.dataset.transactions.push(TransactionRow {
            id: Uuid::new_v4(),
            campus_id: None,
            kind: "income".into(),
            amount: 10.0,
            description: None,
            date: at(2025, 6, 3),
        });
        f.dataset.transactions.push(TransactionRow {
            id: Uuid::new_v4(),
            campus_id: Some(Uuid::new_v4()),
            kind: "expense".into(),
            amount: 4.0,
            description: None,
            date: at(2025, 6, 3),
        });

        let report = campus_budgets(&f.dataset, &ReportFilters::default(), offset());

        assert_eq!(report.campus_count, 2);
        assert_eq!(report.data.len(), 2);
        assert!(report.data.iter().all(|c| c.name != UNKNOWN_CAMPUS));
        assert_eq!(report.total_budget, 85.0);
        assert_eq!(report.avg_budget, 42.5);
        assert_eq!(report.unattributed_budget, 6.0);
    }
}
