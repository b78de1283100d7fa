use derive_new::new;

#[derive(new)]
pub struct CreateClub {
    pub club_name: String,
}
