//! Customer service

use std::collections::HashSet;

use chrono::Datelike;
use md_contracts::CustomerContract;
use md_core::error::MdError;
use md_core::result::MdResult;
use md_core::types::prefixed_id;
use md_models::{Customer, CustomerInput};
use md_store::{CustomerRepository, DataDir, RepositoryError};
use rand::Rng;
use tracing::{info, instrument};

use crate::validate_with;

/// Account code suffixes are drawn from this range
const ACCOUNT_CODE_RANGE: std::ops::RangeInclusive<u32> = 1000..=9999;

#[derive(Clone)]
pub struct CustomerService {
    customers: CustomerRepository,
}

impl CustomerService {
    pub fn new(dir: DataDir) -> Self {
        Self {
            customers: CustomerRepository::new(dir),
        }
    }

    /// All customers, soft-deleted ones included
    pub async fn list(&self) -> MdResult<Vec<Customer>> {
        Ok(self.customers.find_all().await?)
    }

    pub async fn get(&self, id: &str) -> MdResult<Customer> {
        Ok(self.customers.get(id).await?)
    }

    /// Create a customer with a fresh account code (`C-{year}-{nnnn}`)
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CustomerInput) -> MdResult<Customer> {
        validate_with(&CustomerContract, &input)?;

        let year = chrono::Utc::now().year();
        let customer = self
            .customers
            .mutate(|customers| {
                let taken: HashSet<&str> = customers
                    .iter()
                    .filter_map(|c| c.account_code.as_deref())
                    .collect();
                let code = free_account_code(year, &taken)?;

                let customer = Customer {
                    id: prefixed_id("CST"),
                    name: input.name,
                    segment: input.segment,
                    location: input.location,
                    jobs: 0,
                    contact: input.contact,
                    deleted: false,
                    account_code: Some(code),
                    extra: Default::default(),
                };
                customers.push(customer.clone());
                Ok::<_, MdError>(customer)
            })
            .await?;

        info!(id = %customer.id, account_code = ?customer.account_code, "Customer created");
        Ok(customer)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: CustomerInput) -> MdResult<Customer> {
        validate_with(&CustomerContract, &input)?;

        self.customers
            .modify(id, |customer| {
                customer.name = input.name;
                customer.segment = input.segment;
                customer.location = input.location;
                customer.contact = input.contact;
                Ok::<_, MdError>(())
            })
            .await
    }

    /// Mark a customer deleted; the record stays in the file
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: &str) -> MdResult<Customer> {
        let customer = self
            .customers
            .modify(id, |customer| {
                customer.deleted = true;
                Ok::<_, RepositoryError>(())
            })
            .await?;
        info!(id = %customer.id, "Customer soft-deleted");
        Ok(customer)
    }
}

/// Pick a random account code not yet in `taken`
fn free_account_code(year: i32, taken: &HashSet<&str>) -> MdResult<String> {
    let capacity = (ACCOUNT_CODE_RANGE.end() - ACCOUNT_CODE_RANGE.start() + 1) as usize;
    let prefix = format!("C-{}-", year);
    let used = taken.iter().filter(|c| c.starts_with(&prefix)).count();
    if used >= capacity {
        return Err(MdError::conflict(format!("no free account codes left for {}", year)));
    }

    let mut rng = rand::rng();
    loop {
        let code = format!("{}{}", prefix, rng.random_range(ACCOUNT_CODE_RANGE));
        if !taken.contains(code.as_str()) {
            return Ok(code);
        }
    }
}
