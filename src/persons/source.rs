use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use crate::{
    consts::consts::{PageNumber, PersonId},
    http::client::{ApiClient, ApiResult},
    model::{
        page::PersonPage,
        person::{Person, PersonRecord, PersonV2},
    },
};

#[derive(Clone, Debug, PartialEq)]
pub struct PageQuery {
    pub page: PageNumber,
    pub items_per_page: usize,
    /// Matched against the record name, empty matches everything
    pub person_name: String,
}

/// Where records come from. The http sources talk to the backend, tests substitute an in memory one.
#[async_trait]
pub trait PersonSource: Send + Sync + 'static {
    type Record: PersonRecord;

    async fn fetch_page(&self, query: &PageQuery) -> ApiResult<PersonPage<Self::Record>>;
    async fn create(&self, record: &Self::Record) -> ApiResult<()>;
    async fn update(&self, id: &PersonId, record: &Self::Record) -> ApiResult<()>;
    async fn delete(&self, id: &PersonId) -> ApiResult<()>;
}

#[async_trait]
impl<T: PersonSource> PersonSource for Arc<T> {
    type Record = T::Record;

    async fn fetch_page(&self, query: &PageQuery) -> ApiResult<PersonPage<Self::Record>> {
        (**self).fetch_page(query).await
    }

    async fn create(&self, record: &Self::Record) -> ApiResult<()> {
        (**self).create(record).await
    }

    async fn update(&self, id: &PersonId, record: &Self::Record) -> ApiResult<()> {
        (**self).update(id, record).await
    }

    async fn delete(&self, id: &PersonId) -> ApiResult<()> {
        (**self).delete(id).await
    }
}

/// Case insensitive substring match on the name
#[tracing::instrument(skip(people))]
pub fn filter_by_name<R: PersonRecord>(people: Vec<R>, person_name: &str) -> Vec<R> {
    let needle = person_name.trim().to_lowercase();

    if needle.is_empty() {
        return people;
    }

    people
        .into_iter()
        .filter(|person| person.name().to_lowercase().contains(&needle))
        .collect()
}

/// First generation endpoints, `GET /persons` returns every record so search and paging happen here
pub struct PersonsV1Source {
    client: ApiClient,
}

impl PersonsV1Source {
    pub const PATH: &'static str = "/persons";

    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PersonSource for PersonsV1Source {
    type Record = Person;

    async fn fetch_page(&self, query: &PageQuery) -> ApiResult<PersonPage<Person>> {
        let people: Vec<Person> = self.client.get(Self::PATH, &[]).await?;

        let matching = filter_by_name(people, &query.person_name);

        Ok(PersonPage::from_slice(
            &matching,
            query.page.to_number(),
            query.items_per_page,
        ))
    }

    async fn create(&self, record: &Person) -> ApiResult<()> {
        self.client.send_body(Method::POST, Self::PATH, record).await
    }

    async fn update(&self, id: &PersonId, record: &Person) -> ApiResult<()> {
        self.client
            .send_body(Method::PUT, &format!("{}/{}", Self::PATH, id), record)
            .await
    }

    async fn delete(&self, id: &PersonId) -> ApiResult<()> {
        self.client.delete(&format!("{}/{}", Self::PATH, id)).await
    }
}

/// Second generation endpoints with server side paging and name search
pub struct PersonsV2Source {
    client: ApiClient,
}

impl PersonsV2Source {
    pub const PATH: &'static str = "/v2/persons";

    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PersonSource for PersonsV2Source {
    type Record = PersonV2;

    #[tracing::instrument(skip(self))]
    async fn fetch_page(&self, query: &PageQuery) -> ApiResult<PersonPage<PersonV2>> {
        self.client
            .get(
                Self::PATH,
                &[
                    ("page", query.page.to_number().to_string()),
                    ("itemsPerPage", query.items_per_page.to_string()),
                    ("personName", query.person_name.clone()),
                ],
            )
            .await
    }

    async fn create(&self, record: &PersonV2) -> ApiResult<()> {
        self.client.send_body(Method::POST, Self::PATH, record).await
    }

    async fn update(&self, id: &PersonId, record: &PersonV2) -> ApiResult<()> {
        self.client
            .send_body(Method::PUT, &format!("{}/{}", Self::PATH, id), record)
            .await
    }

    async fn delete(&self, id: &PersonId) -> ApiResult<()> {
        self.client.delete(&format!("{}/{}", Self::PATH, id)).await
    }
}
