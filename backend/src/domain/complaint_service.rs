//! Complaints and the replies from the community board.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{ComplaintRepository, UserRepository};
use super::{
    ActorLoader, Attachment, Complaint, ComplaintContent, ComplaintId, ComplaintView, Error,
    FileCategory, Page, PageRequest, Role, StoredFileName, Uploader, User, UserId,
    complaint_response, require_community, require_role, require_same_community,
};

/// Complaint operations scoped to the actor's community.
#[derive(Clone)]
pub struct ComplaintService {
    actors: ActorLoader,
    users: Arc<dyn UserRepository>,
    complaints: Arc<dyn ComplaintRepository>,
    uploads: Uploader,
    clock: Arc<dyn Clock>,
}

impl ComplaintService {
    /// Assemble the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        complaints: Arc<dyn ComplaintRepository>,
        uploads: Uploader,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            actors: ActorLoader::new(Arc::clone(&users)),
            users,
            complaints,
            uploads,
            clock,
        }
    }

    /// Lodge a complaint, optionally anonymous and with a photo.
    pub async fn create(
        &self,
        actor: &UserId,
        content: ComplaintContent,
        anonymous: bool,
        image: Option<Attachment>,
    ) -> Result<ComplaintView, Error> {
        let actor = self.actors.load(actor).await?;
        let community_id = require_community(&actor)?;
        let image = match image {
            Some(image) => Some(
                self.uploads
                    .store_image(FileCategory::Complaints, image)
                    .await?,
            ),
            None => None,
        };
        let complaint = Complaint {
            id: ComplaintId::random(),
            content: content.into_inner(),
            anonymous,
            image,
            created_at: self.clock.utc(),
            response: None,
            responded_at: None,
            author_id: actor.id,
            community_id,
        };
        if let Err(error) = self.complaints.insert(&complaint).await {
            self.discard_image(complaint.image.as_ref()).await;
            return Err(error.into());
        }
        info!(complaint_id = %complaint.id, anonymous, "complaint lodged");
        Ok(ComplaintView {
            complaint,
            author_name: actor.full_name.to_string(),
        })
    }

    /// Complaints lodged by the actor.
    pub async fn mine(
        &self,
        actor: &UserId,
        page: PageRequest,
    ) -> Result<Page<ComplaintView>, Error> {
        let actor = self.actors.load(actor).await?;
        require_community(&actor)?;
        Ok(self.complaints.list_by_author(&actor.id, page).await?)
    }

    /// Complaints lodged in the actor's community.
    pub async fn community(
        &self,
        actor: &UserId,
        page: PageRequest,
    ) -> Result<Page<ComplaintView>, Error> {
        let actor = self.actors.load(actor).await?;
        let community = require_community(&actor)?;
        Ok(self.complaints.list_by_community(&community, page).await?)
    }

    /// Record the board's reply to a complaint.
    pub async fn reply(
        &self,
        actor: &UserId,
        id: &ComplaintId,
        response: &str,
    ) -> Result<ComplaintView, Error> {
        let response = complaint_response(response)?;
        let actor = self.actors.load(actor).await?;
        require_role(&actor, &[Role::President, Role::Administrator])?;
        let mut complaint = self.find(id).await?;
        require_same_community(&actor, complaint.community_id)?;

        let responded_at = self.clock.utc();
        self.complaints
            .save_response(id, &response, responded_at)
            .await?;
        complaint.response = Some(response);
        complaint.responded_at = Some(responded_at);
        info!(complaint_id = %id, "complaint answered");

        let author_name = self
            .users
            .find_by_id(&complaint.author_id)
            .await?
            .map(|author: User| author.full_name.to_string())
            .unwrap_or_default();
        Ok(ComplaintView {
            complaint,
            author_name,
        })
    }

    /// Delete a complaint and its photo.
    pub async fn delete(&self, actor: &UserId, id: &ComplaintId) -> Result<(), Error> {
        let actor = self.actors.load(actor).await?;
        let complaint = self.find(id).await?;
        require_same_community(&actor, complaint.community_id)?;
        if actor.role != Role::President && complaint.author_id != actor.id {
            return Err(Error::forbidden(
                "only the president or the author can delete a complaint",
            ));
        }
        self.complaints.delete(id).await?;
        self.discard_image(complaint.image.as_ref()).await;
        info!(complaint_id = %id, "complaint deleted");
        Ok(())
    }

    /// Bytes of a stored complaint photo.
    pub async fn download(&self, raw_name: &str) -> Result<(StoredFileName, Vec<u8>), Error> {
        self.uploads.read(FileCategory::Complaints, raw_name).await
    }

    async fn find(&self, id: &ComplaintId) -> Result<Complaint, Error> {
        self.complaints
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("complaint {id} not found")))
    }

    async fn discard_image(&self, image: Option<&StoredFileName>) {
        if let Some(image) = image {
            self.uploads
                .discard_all(FileCategory::Complaints, std::slice::from_ref(image))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockComplaintRepository, MockFileStorage, MockUserRepository};
    use crate::domain::test_support::{FixtureClock, fixture_date, user_with_role};
    use crate::domain::{CommunityId, ErrorCode, UploadPolicy};
    use rstest::rstest;

    fn users_containing(members: Vec<User>) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |id| {
            Ok(members.iter().find(|user| user.id == *id).cloned())
        });
        users
    }

    fn complaint(community: CommunityId, author: UserId) -> Complaint {
        Complaint {
            id: ComplaintId::random(),
            content: "Noise at night".to_owned(),
            anonymous: true,
            image: None,
            created_at: FixtureClock::at(fixture_date(), 8, 0).utc_now,
            response: None,
            responded_at: None,
            author_id: author,
            community_id: community,
        }
    }

    fn service(
        members: Vec<User>,
        complaints: MockComplaintRepository,
        storage: MockFileStorage,
    ) -> ComplaintService {
        ComplaintService::new(
            Arc::new(users_containing(members)),
            Arc::new(complaints),
            Uploader::new(Arc::new(storage), UploadPolicy::default()),
            Arc::new(FixtureClock::at(fixture_date(), 12, 0)),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_complaints_hide_the_author() {
        let actor = user_with_role(Role::Resident, Some(CommunityId::random()));
        let actor_id = actor.id;
        let mut complaints = MockComplaintRepository::new();
        complaints.expect_insert().returning(|_| Ok(()));
        let content = ComplaintContent::try_new("Noise at night").expect("content");

        let view = service(vec![actor], complaints, MockFileStorage::new())
            .create(&actor_id, content, true, None)
            .await
            .expect("created");
        assert_eq!(view.display_author(), crate::domain::ANONYMOUS_AUTHOR);
        assert_eq!(view.complaint.author_id, actor_id);
    }

    #[rstest]
    #[tokio::test]
    async fn reply_stamps_response_date() {
        let community = CommunityId::random();
        let president = user_with_role(Role::President, Some(community));
        let author = user_with_role(Role::Resident, Some(community));
        let existing = complaint(community, author.id);
        let id = existing.id;
        let mut complaints = MockComplaintRepository::new();
        complaints
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        complaints
            .expect_save_response()
            .withf(|_, response, _| response == "We will look into it")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let view = service(
            vec![president.clone(), author],
            complaints,
            MockFileStorage::new(),
        )
        .reply(&president.id, &id, " We will look into it ")
        .await
        .expect("answered");
        assert_eq!(
            view.complaint.responded_at,
            Some(FixtureClock::at(fixture_date(), 12, 0).utc_now)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn residents_cannot_reply() {
        let resident = user_with_role(Role::Resident, Some(CommunityId::random()));
        let error = service(
            vec![resident.clone()],
            MockComplaintRepository::new(),
            MockFileStorage::new(),
        )
        .reply(&resident.id, &ComplaintId::random(), "ok")
        .await
        .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case::author(Role::Resident, true, true)]
    #[case::president(Role::President, false, true)]
    #[case::administrator(Role::Administrator, false, false)]
    #[case::other_resident(Role::Resident, false, false)]
    #[tokio::test]
    async fn delete_permissions(
        #[case] role: Role,
        #[case] is_author: bool,
        #[case] allowed: bool,
    ) {
        let community = CommunityId::random();
        let actor = user_with_role(role, Some(community));
        let author = if is_author { actor.id } else { UserId::random() };
        let existing = complaint(community, author);
        let id = existing.id;
        let mut complaints = MockComplaintRepository::new();
        complaints
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        complaints
            .expect_delete()
            .times(usize::from(allowed))
            .returning(|_| Ok(()));

        let result = service(vec![actor.clone()], complaints, MockFileStorage::new())
            .delete(&actor.id, &id)
            .await;
        assert_eq!(result.is_ok(), allowed);
    }
}
