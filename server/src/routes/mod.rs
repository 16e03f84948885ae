pub mod track_form;
pub mod list_tracks;
pub mod get_track_by_id;
pub mod create_track;
pub mod update_track;
pub mod delete_track;
pub mod search_tracks;
pub mod get_upload;
