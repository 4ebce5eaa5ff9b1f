use async_trait::async_trait;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::{auth, event, group};

use super::Repository;
use super::model::{ItemStatus, Reservation, ReservationDto, ReservationStatus, Summary, Trip};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Vote {
    status: ItemStatus,
    summary: Summary,
}

impl Vote {
    pub const fn status(&self) -> ItemStatus {
        self.status
    }

    pub const fn summary(&self) -> &Summary {
        &self.summary
    }
}

#[async_trait]
pub trait ReservationService {
    async fn create(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
        trip: Trip,
    ) -> super::Result<ReservationDto>;

    async fn find_by_group(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
    ) -> super::Result<ReservationDto>;

    async fn vote(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
        status: ItemStatus,
    ) -> super::Result<Vote>;

    async fn set_status(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
        status: ReservationStatus,
    ) -> super::Result<ReservationDto>;

    async fn delete(&self, auth_user: &auth::User, group_id: &group::Id) -> super::Result<()>;
}

#[derive(Clone)]
pub struct ReservationServiceImpl {
    repo: Repository,
    group_service: group::Service,
    event_service: event::Service,
}

impl ReservationServiceImpl {
    pub fn new(
        repo: Repository,
        group_service: group::Service,
        event_service: event::Service,
    ) -> Self {
        Self {
            repo,
            group_service,
            event_service,
        }
    }
}

#[async_trait]
impl ReservationService for ReservationServiceImpl {
    async fn create(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
        trip: Trip,
    ) -> super::Result<ReservationDto> {
        self.group_service
            .check_member(group_id, auth_user.id())
            .await?;
        trip.validate()?;

        if self.repo.find_by_group(group_id)?.is_some() {
            return Err(super::Error::AlreadyExists(*group_id));
        }

        let reservation = Reservation::new(*group_id, trip, *auth_user.id());
        self.repo.insert(&reservation)?;
        debug!("created reservation {} for group {group_id}", reservation.id());

        let dto = ReservationDto::new(reservation, vec![]);
        self.notify(group_id, &event::Notification::ReservationUpdated {
            reservation: dto.clone(),
        })
        .await;
        Ok(dto.seen_by(auth_user.id()))
    }

    async fn find_by_group(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
    ) -> super::Result<ReservationDto> {
        self.group_service
            .check_member(group_id, auth_user.id())
            .await?;

        let dto = self.load(group_id)?;
        Ok(dto.seen_by(auth_user.id()))
    }

    async fn vote(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
        status: ItemStatus,
    ) -> super::Result<Vote> {
        self.group_service
            .check_member(group_id, auth_user.id())
            .await?;

        let (status, items) = self.repo.vote(group_id, auth_user.id(), status)?;
        let summary = Summary::of(&items);

        match self.repo.find_by_group(group_id) {
            Ok(Some(reservation)) => {
                let notification = event::Notification::ReservationUpdated {
                    reservation: ReservationDto::new(reservation, items),
                };
                self.notify(group_id, &notification).await;
            }
            Ok(None) => {}
            Err(e) => error!("failed to load reservation of group {group_id}: {e:?}"),
        }

        Ok(Vote { status, summary })
    }

    async fn set_status(
        &self,
        auth_user: &auth::User,
        group_id: &group::Id,
        status: ReservationStatus,
    ) -> super::Result<ReservationDto> {
        self.ensure_creator(auth_user, group_id).await?;

        if !self.repo.set_status(group_id, status)? {
            return Err(super::Error::NotFound(*group_id));
        }

        let dto = self.load(group_id)?;
        self.notify(group_id, &event::Notification::ReservationUpdated {
            reservation: dto.clone(),
        })
        .await;
        Ok(dto.seen_by(auth_user.id()))
    }

    async fn delete(&self, auth_user: &auth::User, group_id: &group::Id) -> super::Result<()> {
        self.ensure_creator(auth_user, group_id).await?;

        if !self.repo.delete(group_id)? {
            return Err(super::Error::NotFound(*group_id));
        }
        debug!("deleted reservation of group {group_id}");

        self.notify(group_id, &event::Notification::ReservationDeleted {
            group_id: *group_id,
        })
        .await;
        Ok(())
    }
}

impl ReservationServiceImpl {
    fn load(&self, group_id: &group::Id) -> super::Result<ReservationDto> {
        let reservation = self
            .repo
            .find_by_group(group_id)?
            .ok_or(super::Error::NotFound(*group_id))?;
        let items = self.repo.find_items(reservation.id())?;

        Ok(ReservationDto::new(reservation, items))
    }

    async fn ensure_creator(&self, auth_user: &auth::User, group_id: &group::Id) -> super::Result<()> {
        let group = self.group_service.find_by_id(auth_user, group_id).await?;
        if !group.is_creator(auth_user.id()) {
            return Err(super::Error::NotCreator);
        }
        Ok(())
    }

    async fn notify(&self, group_id: &group::Id, notification: &event::Notification) {
        match self.group_service.find_participants(group_id).await {
            Ok(participants) => {
                let subjects = participants
                    .into_iter()
                    .map(event::Subject::Notifications)
                    .collect::<Vec<_>>();
                self.event_service.broadcast(&subjects, notification).await;
            }
            Err(e) => error!("failed to find participants of group {group_id}: {e:?}"),
        }
    }
}
