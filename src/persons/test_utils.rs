use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    consts::consts::PersonId,
    http::client::{ApiError, ApiResult},
    model::{
        page::PersonPage,
        person::{Address, Gender, PersonV2},
    },
};

use super::source::{filter_by_name, PageQuery, PersonSource};

/// Backend stand-in that pages and filters like the v2 endpoint
pub struct InMemorySource {
    pub people: Mutex<Vec<PersonV2>>,
    pub queries: Mutex<Vec<PageQuery>>,
    /// Popped per fetch, lets a test make an earlier request answer after a later one
    pub delays: Mutex<VecDeque<Duration>>,
    pub fail_fetches: Mutex<bool>,
    /// Next create / update / delete answers with this error instead
    pub next_write_error: Mutex<Option<ApiError>>,
    /// Every create / update / delete waits this long before answering
    pub write_delay: Mutex<Option<Duration>>,
    next_id: AtomicU64,
}

impl InMemorySource {
    pub fn with_people(count: usize) -> Self {
        let people = (1..=count).map(|i| new_person(i as u64, &format!("Person {}", i)));

        Self {
            people: Mutex::new(people.collect()),
            queries: Mutex::new(vec![]),
            delays: Mutex::new(VecDeque::new()),
            fail_fetches: Mutex::new(false),
            next_write_error: Mutex::new(None),
            write_delay: Mutex::new(None),
            next_id: AtomicU64::new(count as u64 + 1),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<PageQuery> {
        self.queries.lock().unwrap().last().cloned()
    }

    async fn answer_write(&self) -> ApiResult<()> {
        let delay = *self.write_delay.lock().unwrap();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.take_write_error()
    }

    fn take_write_error(&self) -> ApiResult<()> {
        match self.next_write_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub fn new_person(id: u64, name: &str) -> PersonV2 {
    PersonV2 {
        id: Some(id),
        name: name.to_string(),
        gender: Some(Gender::O),
        email: format!("person{}@example.com", id),
        date_of_birth: "1990-01-01".to_string(),
        nationality: "Brazilian".to_string(),
        naturalness: "Recife".to_string(),
        cpf: format!("000.000.000-{:02}", id % 100),
        address: Address::default(),
    }
}

#[async_trait]
impl PersonSource for InMemorySource {
    type Record = PersonV2;

    async fn fetch_page(&self, query: &PageQuery) -> ApiResult<PersonPage<PersonV2>> {
        self.queries.lock().unwrap().push(query.clone());

        let delay = self.delays.lock().unwrap().pop_front();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_fetches.lock().unwrap() {
            return Err(ApiError::Status {
                status: 500,
                message: "Internal server error".to_string(),
            });
        }

        let people = self.people.lock().unwrap().clone();
        let matching = filter_by_name(people, &query.person_name);

        Ok(PersonPage::from_slice(
            &matching,
            query.page.to_number(),
            query.items_per_page,
        ))
    }

    async fn create(&self, record: &PersonV2) -> ApiResult<()> {
        self.answer_write().await?;

        let mut person = record.clone();
        person.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.people.lock().unwrap().push(person);

        Ok(())
    }

    async fn update(&self, id: &PersonId, record: &PersonV2) -> ApiResult<()> {
        self.answer_write().await?;

        let mut people = self.people.lock().unwrap();

        match people
            .iter_mut()
            .find(|p| p.id.map(PersonId::from).as_ref() == Some(id))
        {
            Some(existing) => {
                *existing = PersonV2 {
                    id: existing.id,
                    ..record.clone()
                };
                Ok(())
            }
            None => Err(ApiError::Status {
                status: 404,
                message: format!("Person with ID {} not found", id),
            }),
        }
    }

    async fn delete(&self, id: &PersonId) -> ApiResult<()> {
        self.answer_write().await?;

        self.people
            .lock()
            .unwrap()
            .retain(|p| p.id.map(PersonId::from).as_ref() != Some(id));

        Ok(())
    }
}
